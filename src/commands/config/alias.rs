use crate::{
    commands::is_registered,
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        handler::Handler,
        response::{ResponseError, ResponseResult},
    },
};

pub struct AliasCommand;

#[async_trait::async_trait]
impl Command for AliasCommand {
    fn name(&self) -> &'static str {
        "alias"
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
            Some("add") => {
                let (Some(alias_name), Some(command_name)) = (args.next(), args.next()) else {
                    return ctx
                        .say(format!(
                            "Please provide both an alias name and a command. `{}alias add <alias_name> <command_name>`",
                            ctx.config.prefix
                        ))
                        .await;
                };

                // Targets are validated here, at creation time, and never
                // again at resolution time.
                if !is_registered(&command_name) {
                    return Err(ResponseError::InvalidArgument(format!(
                        "Command `{command_name}` does not exist."
                    )));
                }

                handler
                    .store
                    .update_guild(ctx.guild.id, |config| {
                        config
                            .aliases
                            .insert(alias_name.clone(), command_name.clone());
                    })
                    .await?;
                ctx.say(format!("Added alias: `{alias_name}` → `{command_name}`"))
                    .await
            }
            Some("remove") => {
                let Some(alias_name) = args.next() else {
                    return ctx
                        .say(format!(
                            "Please provide an alias name to remove. `{}alias remove <alias_name>`",
                            ctx.config.prefix
                        ))
                        .await;
                };

                let removed = handler
                    .store
                    .update_guild(ctx.guild.id, |config| {
                        config.aliases.remove(&alias_name).is_some()
                    })
                    .await?;
                if removed {
                    ctx.say(format!("Removed alias: `{alias_name}`")).await
                } else {
                    ctx.say(format!("Alias `{alias_name}` not found.")).await
                }
            }
            Some("list") => {
                let config = handler.store.get_guild(ctx.guild.id).await?;
                if config.aliases.is_empty() {
                    return ctx.say("No aliases configured for this server.").await;
                }

                let prefix = &config.prefix;
                let mut lines: Vec<String> = config
                    .aliases
                    .iter()
                    .map(|(alias, command)| format!("`{prefix}{alias}` → `{prefix}{command}`"))
                    .collect();
                lines.sort();
                ctx.say(format!("Server Aliases:\n{}", lines.join("\n")))
                    .await
            }
            Some("removeall") => {
                let had_any = handler
                    .store
                    .update_guild(ctx.guild.id, |config| {
                        let had_any = !config.aliases.is_empty();
                        config.aliases.clear();
                        had_any
                    })
                    .await?;
                if had_any {
                    ctx.say("All aliases have been removed.").await
                } else {
                    ctx.say("No aliases to remove.").await
                }
            }
            _ => {
                let prefix = &ctx.config.prefix;
                ctx.say(format!(
                    "Usage:\n`{prefix}alias add <alias_name> <command_name>`\n`{prefix}alias remove <alias_name>`\n`{prefix}alias list`\n`{prefix}alias removeall`"
                ))
                .await
            }
        }
    }
}
