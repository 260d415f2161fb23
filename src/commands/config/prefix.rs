use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        config::DEFAULT_PREFIX,
        handler::Handler,
        response::ResponseResult,
    },
};

pub struct PrefixCommand;

#[async_trait::async_trait]
impl Command for PrefixCommand {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn admin_only(&self) -> bool {
        true
    }

    async fn run(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        args: &mut Args,
    ) -> ResponseResult {
        let action = args.next();

        match action.as_deref() {
            Some("set") => {
                let Some(new_prefix) = args.next() else {
                    return ctx
                        .say(format!(
                            "Please provide a new prefix. `{}prefix set <new_prefix>`",
                            ctx.config.prefix
                        ))
                        .await;
                };

                handler
                    .store
                    .update_guild(ctx.guild.id, |config| config.prefix = new_prefix.clone())
                    .await?;
                ctx.say(format!("Prefix changed to: `{new_prefix}`")).await
            }
            Some("remove") => {
                handler
                    .store
                    .update_guild(ctx.guild.id, |config| {
                        config.prefix = DEFAULT_PREFIX.to_string();
                    })
                    .await?;
                ctx.say(format!("Prefix reset to default: `{DEFAULT_PREFIX}`"))
                    .await
            }
            Some("list") => {
                ctx.say(format!("Current prefix: `{}`", ctx.config.prefix))
                    .await
            }
            _ => {
                let prefix = &ctx.config.prefix;
                ctx.say(format!(
                    "Usage:\n`{prefix}prefix set <new_prefix>`\n`{prefix}prefix remove`\n`{prefix}prefix list`"
                ))
                .await
            }
        }
    }
}
