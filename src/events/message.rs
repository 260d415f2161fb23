use serenity::{
    all::{Message, PartialGuild, Permissions},
    prelude::Context as IncomingContext,
};
use tracing::{debug, error};

use crate::{
    commands::get_command_list,
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::CommandContext, handler::Handler, permissions, response::ResponseError,
    },
    moderation::platform::PlatformError,
};

impl Handler {
    /// The command dispatcher: whitelist gate, per-guild prefix, alias
    /// rewrite, permission metadata check, then the handler itself. Each
    /// inbound message is its own task; nothing here assumes ordering
    /// with other commands in the same guild.
    pub async fn on_message(&self, ctx: IncomingContext, message: Message) {
        if message.author.bot {
            return;
        }
        let Some(guild_id) = message.guild_id else {
            return;
        };

        let global = match self.store.get_global().await {
            Ok(global) => global,
            Err(err) => {
                error!("Failed to load the global configuration: {err}");
                return;
            }
        };
        if !global.permits(guild_id) {
            return;
        }

        let config = match self.store.get_guild(guild_id).await {
            Ok(config) => config,
            Err(err) => {
                error!("Failed to load configuration for guild {guild_id}: {err}");
                return;
            }
        };

        let Some(invocation) = message.content.strip_prefix(&config.prefix) else {
            return;
        };
        let (typed, raw_args) = match invocation.split_once(char::is_whitespace) {
            Some((typed, rest)) => (typed, rest),
            None => (invocation, ""),
        };
        if typed.is_empty() {
            return;
        }

        // One alias hop at most. If the rewritten name is not a real
        // command the whole invocation is dropped silently.
        let canonical = config.resolve_alias(typed).unwrap_or(typed).to_string();
        let Some(command) = get_command_list()
            .into_iter()
            .find(|command| command.name() == canonical)
        else {
            debug!("Ignoring unknown command `{canonical}` in guild {guild_id}");
            return;
        };

        let mut guild = guild_id
            .to_guild_cached(&ctx.cache)
            .map(|guild| PartialGuild::from(guild.clone()));
        if guild.is_none() {
            guild = match guild_id.to_partial_guild(&ctx.http).await {
                Ok(guild) => Some(guild),
                Err(err) => {
                    error!("Failed to fetch guild {guild_id}: {err}");
                    return;
                }
            };
        }
        let guild = guild.unwrap();

        let member = match guild_id.member(&ctx.http, message.author.id).await {
            Ok(member) => member,
            Err(err) => {
                error!(
                    "Failed to fetch member {} in guild {guild_id}: {err}",
                    message.author.id.get()
                );
                return;
            }
        };

        let denied = if command.owner_only() {
            message.author.id != self.context.owner_id
        } else if command.admin_only() {
            !permissions::native_permissions(&guild, &member).contains(Permissions::ADMINISTRATOR)
        } else if let Some(required) = command.required_permission() {
            !permissions::authorize(
                permissions::native_permissions(&guild, &member),
                &member.roles,
                &config,
                required,
            )
        } else {
            false
        };
        if denied {
            if let Err(err) = message
                .channel_id
                .say(&ctx.http, "You don't have permission to use this command.")
                .await
            {
                error!("Failed to send a permission denial: {err}");
            }
            return;
        }

        let mut args = Args::new(raw_args);
        let engine = self.engine(&ctx);
        let command_context = CommandContext {
            ctx,
            guild,
            message,
            member,
            config,
            engine,
        };

        if let Err(err) = command.run(self, &command_context, &mut args).await {
            match &err {
                ResponseError::Storage(detail) => {
                    error!("Storage error while handling `{canonical}`: {detail}");
                }
                ResponseError::Serenity(detail) => {
                    error!("Unexpected error while handling `{canonical}`: {detail}");
                }
                ResponseError::Platform(PlatformError::Other(detail)) => {
                    error!("Platform error while handling `{canonical}`: {detail}");
                }
                _ => {}
            }

            if let Err(reply_err) = command_context.say(err.user_message()).await {
                error!("Failed to report a command error: {reply_err:?}");
            }
        }
    }
}
