use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        handler::Handler,
        response::ResponseResult,
    },
};

/// Owner-only control over which guilds the bot will operate in. An
/// empty whitelist disables the restriction entirely.
pub struct WhitelistCommand;

#[async_trait::async_trait]
impl Command for WhitelistCommand {
    fn name(&self) -> &'static str {
        "whitelist"
    }

    fn owner_only(&self) -> bool {
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
                let Some(guild_id) = args.next() else {
                    return ctx.say("Please provide a server ID to whitelist.").await;
                };

                let added = handler
                    .store
                    .update_global(|config| config.whitelisted_guilds.insert(guild_id.clone()))
                    .await?;
                if added {
                    ctx.say(format!("Server {guild_id} has been whitelisted."))
                        .await
                } else {
                    ctx.say(format!("Server {guild_id} is already whitelisted."))
                        .await
                }
            }
            Some("remove") => {
                let Some(guild_id) = args.next() else {
                    return ctx
                        .say("Please provide a server ID to remove from the whitelist.")
                        .await;
                };

                let removed = handler
                    .store
                    .update_global(|config| config.whitelisted_guilds.remove(&guild_id))
                    .await?;
                if removed {
                    ctx.say(format!(
                        "Server {guild_id} has been removed from the whitelist."
                    ))
                    .await
                } else {
                    ctx.say(format!("Server {guild_id} is not whitelisted.")).await
                }
            }
            Some("list") => {
                let config = handler.store.get_global().await?;
                if config.whitelisted_guilds.is_empty() {
                    return ctx.say("No servers are whitelisted.").await;
                }

                let mut ids: Vec<&String> = config.whitelisted_guilds.iter().collect();
                ids.sort();
                let listed = ids
                    .into_iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\n");
                ctx.say(format!("Whitelisted Servers:\n{listed}")).await
            }
            Some("clear") => {
                handler
                    .store
                    .update_global(|config| config.whitelisted_guilds.clear())
                    .await?;
                ctx.say("Server whitelist has been cleared.").await
            }
            _ => {
                let prefix = &ctx.config.prefix;
                ctx.say(format!(
                    "Usage:\n`{prefix}whitelist add <server_id>`\n`{prefix}whitelist remove <server_id>`\n`{prefix}whitelist list`\n`{prefix}whitelist clear`"
                ))
                .await
            }
        }
    }
}
