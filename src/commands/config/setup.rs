use serenity::{
    all::{ChannelType, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId},
    builder::{CreateChannel, EditRole},
};
use tracing::debug;

use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        config::JailConfig,
        handler::Handler,
        response::{ResponseError, ResponseResult},
    },
    moderation::platform::classify,
};

fn hidden_from_everyone(guild_everyone: RoleId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::VIEW_CHANNEL,
        kind: PermissionOverwriteType::Role(guild_everyone),
    }
}

pub struct SetupLogsCommand;

#[async_trait::async_trait]
impl Command for SetupLogsCommand {
    fn name(&self) -> &'static str {
        "setuplogs"
    }

    fn admin_only(&self) -> bool {
        true
    }

    async fn run(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        _args: &mut Args,
    ) -> ResponseResult {
        let everyone = RoleId::new(ctx.guild.id.get());

        let logs_channel = ctx
            .guild
            .id
            .create_channel(
                &ctx.ctx.http,
                CreateChannel::new("logs")
                    .kind(ChannelType::Text)
                    .permissions(vec![hidden_from_everyone(everyone)]),
            )
            .await
            .map_err(|err| ResponseError::from(classify(err)))?;

        // Reuse an existing jail-logs channel if it still exists.
        let channels = ctx
            .guild
            .id
            .channels(&ctx.ctx.http)
            .await
            .map_err(ResponseError::Serenity)?;
        let jail_logs_channel = match ctx
            .config
            .jail_logs_channel_id
            .filter(|id| channels.contains_key(id))
        {
            Some(existing) => existing,
            None => {
                ctx.guild
                    .id
                    .create_channel(
                        &ctx.ctx.http,
                        CreateChannel::new("jail-logs")
                            .kind(ChannelType::Text)
                            .permissions(vec![hidden_from_everyone(everyone)]),
                    )
                    .await
                    .map_err(|err| ResponseError::from(classify(err)))?
                    .id
            }
        };

        handler
            .store
            .update_guild(ctx.guild.id, |config| {
                config.logs_channel_id = Some(logs_channel.id);
                config.jail_logs_channel_id = Some(jail_logs_channel);
            })
            .await?;

        ctx.say(format!(
            "Logging channels have been set up at <#{}>",
            logs_channel.id.get()
        ))
        .await
    }
}

pub struct SetupJailCommand;

#[async_trait::async_trait]
impl Command for SetupJailCommand {
    fn name(&self) -> &'static str {
        "setupjail"
    }

    fn admin_only(&self) -> bool {
        true
    }

    async fn run(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        _args: &mut Args,
    ) -> ResponseResult {
        if let Some(jail) = &ctx.config.jail {
            if ctx.guild.roles.contains_key(&jail.jailed_role_id) {
                return ctx.say("Jail system is already set up for this server.").await;
            }
        }

        let everyone = RoleId::new(ctx.guild.id.get());

        let jailed_role = ctx
            .guild
            .id
            .create_role(&ctx.ctx.http, EditRole::new().name("Jailed"))
            .await
            .map_err(|err| ResponseError::from(classify(err)))?;

        let jail_channel = ctx
            .guild
            .id
            .create_channel(
                &ctx.ctx.http,
                CreateChannel::new("jail")
                    .kind(ChannelType::Text)
                    .permissions(vec![
                        PermissionOverwrite {
                            allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
                            deny: Permissions::empty(),
                            kind: PermissionOverwriteType::Role(jailed_role.id),
                        },
                        hidden_from_everyone(everyone),
                    ]),
            )
            .await
            .map_err(|err| ResponseError::from(classify(err)))?;

        let channels = ctx
            .guild
            .id
            .channels(&ctx.ctx.http)
            .await
            .map_err(ResponseError::Serenity)?;
        let jail_logs_channel = match ctx
            .config
            .jail_logs_channel_id
            .filter(|id| channels.contains_key(id))
        {
            Some(existing) => existing,
            None => {
                ctx.guild
                    .id
                    .create_channel(
                        &ctx.ctx.http,
                        CreateChannel::new("jail-logs")
                            .kind(ChannelType::Text)
                            .permissions(vec![hidden_from_everyone(everyone)]),
                    )
                    .await
                    .map_err(|err| ResponseError::from(classify(err)))?
                    .id
            }
        };

        // Hide every other channel from the jailed role. Best effort per
        // channel; a single misconfigured channel should not abort setup.
        for (channel_id, channel) in &channels {
            if *channel_id == jail_channel.id || *channel_id == jail_logs_channel {
                continue;
            }

            let overwrite = PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL
                    | Permissions::SEND_MESSAGES
                    | Permissions::ADD_REACTIONS,
                kind: PermissionOverwriteType::Role(jailed_role.id),
            };
            if let Err(err) = channel.create_permission(&ctx.ctx.http, overwrite).await {
                debug!(
                    "Failed to hide channel {} from the jailed role: {err}",
                    channel_id.get()
                );
            }
        }

        handler
            .store
            .update_guild(ctx.guild.id, |config| {
                config.jail = Some(JailConfig {
                    jailed_role_id: jailed_role.id,
                    jail_channel_id: jail_channel.id,
                });
                config.jail_logs_channel_id = Some(jail_logs_channel);
            })
            .await?;

        ctx.say(format!(
            "Jail system has been set up at <#{}>",
            jail_logs_channel.get()
        ))
        .await
    }
}

pub struct SetupMuteCommand;

#[async_trait::async_trait]
impl Command for SetupMuteCommand {
    fn name(&self) -> &'static str {
        "setupmute"
    }

    fn admin_only(&self) -> bool {
        true
    }

    async fn run(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        _args: &mut Args,
    ) -> ResponseResult {
        if let Some(mute) = &ctx.config.mute {
            if ctx.guild.roles.contains_key(&mute.muted_role_id) {
                return ctx.say("Mute system is already set up for this server.").await;
            }
        }

        let muted_role = ctx
            .guild
            .id
            .create_role(&ctx.ctx.http, EditRole::new().name("Muted"))
            .await
            .map_err(|err| ResponseError::from(classify(err)))?;

        let channels = ctx
            .guild
            .id
            .channels(&ctx.ctx.http)
            .await
            .map_err(ResponseError::Serenity)?;
        for (channel_id, channel) in &channels {
            let overwrite = PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS,
                kind: PermissionOverwriteType::Role(muted_role.id),
            };
            if let Err(err) = channel.create_permission(&ctx.ctx.http, overwrite).await {
                debug!(
                    "Failed to silence channel {} for the muted role: {err}",
                    channel_id.get()
                );
            }
        }

        handler
            .store
            .update_guild(ctx.guild.id, |config| {
                config.mute = Some(crate::models::config::MuteConfig {
                    muted_role_id: muted_role.id,
                });
            })
            .await?;

        ctx.say("Mute system has been set up").await
    }
}
