use std::collections::HashMap;

use serenity::{
    all::{
        ChannelId, ChannelType, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId,
    },
    builder::{CreateChannel, CreateEmbed, EditChannel},
};
use tracing::debug;

use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        config::VoiceMasterConfig,
        handler::Handler,
        response::{Response, ResponseError, ResponseResult},
    },
    moderation::platform::{classify, DiscordPlatform, PlatformActions},
    voice::provision,
};

/// Temporary voice channels: `vm setup` provisions the join-to-create
/// channel, after which members get their own channel to rename, cap,
/// lock and curate.
pub struct VoiceMasterCommand;

impl VoiceMasterCommand {
    async fn setup(&self, handler: &Handler, ctx: &CommandContext) -> ResponseResult {
        if !ctx
            .author_permissions()
            .contains(Permissions::ADMINISTRATOR)
        {
            return Err(ResponseError::PermissionDenied(
                "You don't have permission to use this command.".to_string(),
            ));
        }

        if ctx
            .config
            .voice_master
            .as_ref()
            .is_some_and(|vm| vm.enabled)
        {
            return ctx
                .say("VoiceMaster is already set up for this server.")
                .await;
        }

        let category = ctx
            .guild
            .id
            .create_channel(
                &ctx.ctx.http,
                CreateChannel::new("Temporary Voice Channels").kind(ChannelType::Category),
            )
            .await
            .map_err(|err| ResponseError::from(classify(err)))?;
        let join_channel = ctx
            .guild
            .id
            .create_channel(
                &ctx.ctx.http,
                CreateChannel::new("➕ Create Voice Channel")
                    .kind(ChannelType::Voice)
                    .category(category.id),
            )
            .await
            .map_err(|err| ResponseError::from(classify(err)))?;

        handler
            .store
            .update_guild(ctx.guild.id, |config| {
                config.voice_master = Some(VoiceMasterConfig {
                    enabled: true,
                    join_channel_id: join_channel.id,
                    category_id: category.id,
                    user_channels: HashMap::new(),
                });
            })
            .await?;

        ctx.say(
            "VoiceMaster has been set up! Join the \"➕ Create Voice Channel\" to get your own temporary voice channel.",
        )
        .await
    }

    fn author_voice_channel(&self, ctx: &CommandContext) -> Option<ChannelId> {
        let guild = ctx.ctx.cache.guild(ctx.guild.id)?;
        guild
            .voice_states
            .get(&ctx.message.author.id)
            .and_then(|state| state.channel_id)
    }

    async fn set_connect_overwrite(
        &self,
        ctx: &CommandContext,
        channel_id: ChannelId,
        overwrite: PermissionOverwrite,
    ) -> Result<(), ResponseError> {
        let channels = ctx
            .guild
            .id
            .channels(&ctx.ctx.http)
            .await
            .map_err(ResponseError::Serenity)?;
        let Some(channel) = channels.get(&channel_id) else {
            return Err(ResponseError::InvalidArgument(
                "Your voice channel could not be found.".to_string(),
            ));
        };
        channel
            .create_permission(&ctx.ctx.http, overwrite)
            .await
            .map_err(|err| ResponseError::from(classify(err)))
    }
}

#[async_trait::async_trait]
impl Command for VoiceMasterCommand {
    fn name(&self) -> &'static str {
        "vm"
    }

    async fn run(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        args: &mut Args,
    ) -> ResponseResult {
        let action = args.next();

        if action.as_deref() == Some("setup") {
            return self.setup(handler, ctx).await;
        }

        if !ctx
            .config
            .voice_master
            .as_ref()
            .is_some_and(|vm| vm.enabled)
        {
            return Err(ResponseError::Execution(
                "VoiceMaster is not set up!",
                Some("Ask an administrator to run the `vm setup` command first.".to_string()),
            ));
        }

        let Some(voice_channel) = self.author_voice_channel(ctx) else {
            return ctx
                .say("You need to be in a voice channel to use VoiceMaster commands.")
                .await;
        };

        if !provision::owns_channel(&ctx.config, voice_channel, ctx.message.author.id) {
            if action.is_none() {
                let platform = DiscordPlatform::new(ctx.ctx.http.clone());
                provision::create_user_channel(
                    &handler.store,
                    &platform,
                    ctx.guild.id,
                    ctx.message.author.id,
                    ctx.member.display_name(),
                )
                .await?;
                return Ok(());
            }
            return ctx
                .say("You need to be in your temporary voice channel to modify it.")
                .await;
        }

        match action.as_deref() {
            None => {
                ctx.say(format!(
                    "You already have a temporary voice channel. Use `{}vm help` to see available commands.",
                    ctx.config.prefix
                ))
                .await
            }
            Some("name") => {
                let Some(value) = args.rest() else {
                    return ctx
                        .say(format!(
                            "Please provide a new name for your channel. Usage: `{}vm name <new_name>`",
                            ctx.config.prefix
                        ))
                        .await;
                };

                voice_channel
                    .edit(&ctx.ctx.http, EditChannel::new().name(value.as_str()))
                    .await
                    .map_err(|err| ResponseError::from(classify(err)))?;
                ctx.say(format!("Channel renamed to: {value}")).await
            }
            Some("limit") => {
                let limit = match args.next() {
                    Some(value) => match value.parse::<u32>() {
                        Ok(limit) => limit,
                        Err(_) => {
                            return ctx
                                .say("Please provide a valid number for the user limit.")
                                .await;
                        }
                    },
                    None => 0,
                };

                voice_channel
                    .edit(&ctx.ctx.http, EditChannel::new().user_limit(limit))
                    .await
                    .map_err(|err| ResponseError::from(classify(err)))?;
                if limit == 0 {
                    ctx.say("User limit removed.").await
                } else {
                    ctx.say(format!("User limit set to {limit} users.")).await
                }
            }
            Some("lock") => {
                let everyone = RoleId::new(ctx.guild.id.get());
                self.set_connect_overwrite(
                    ctx,
                    voice_channel,
                    PermissionOverwrite {
                        allow: Permissions::empty(),
                        deny: Permissions::CONNECT,
                        kind: PermissionOverwriteType::Role(everyone),
                    },
                )
                .await?;
                ctx.say("Your channel has been locked.").await
            }
            Some("unlock") => {
                let everyone = RoleId::new(ctx.guild.id.get());
                self.set_connect_overwrite(
                    ctx,
                    voice_channel,
                    PermissionOverwrite {
                        allow: Permissions::CONNECT,
                        deny: Permissions::empty(),
                        kind: PermissionOverwriteType::Role(everyone),
                    },
                )
                .await?;
                ctx.say("Your channel has been unlocked. Anyone can join now.")
                    .await
            }
            Some("allow") => {
                let Some(user_id) = args.next_user_id() else {
                    return ctx
                        .say(format!(
                            "Please mention a user or provide a user ID. Usage: `{}vm allow @user`",
                            ctx.config.prefix
                        ))
                        .await;
                };

                self.set_connect_overwrite(
                    ctx,
                    voice_channel,
                    PermissionOverwrite {
                        allow: Permissions::CONNECT | Permissions::VIEW_CHANNEL,
                        deny: Permissions::empty(),
                        kind: PermissionOverwriteType::Member(user_id),
                    },
                )
                .await?;
                ctx.say(format!("<@{}> can now join your channel.", user_id.get()))
                    .await
            }
            Some("deny") => {
                let Some(user_id) = args.next_user_id() else {
                    return ctx
                        .say(format!(
                            "Please mention a user or provide a user ID. Usage: `{}vm deny @user`",
                            ctx.config.prefix
                        ))
                        .await;
                };

                // If they are sitting in the channel right now, kick them
                // out of voice before the overwrite lands.
                let target_in_channel = ctx
                    .ctx
                    .cache
                    .guild(ctx.guild.id)
                    .and_then(|guild| {
                        guild
                            .voice_states
                            .get(&user_id)
                            .map(|state| state.channel_id == Some(voice_channel))
                    })
                    .unwrap_or(false);
                if target_in_channel {
                    let platform = DiscordPlatform::new(ctx.ctx.http.clone());
                    if let Err(err) = platform.move_member(ctx.guild.id, user_id, None).await {
                        debug!("Failed to disconnect denied member: {err}");
                    }
                }

                self.set_connect_overwrite(
                    ctx,
                    voice_channel,
                    PermissionOverwrite {
                        allow: Permissions::VIEW_CHANNEL,
                        deny: Permissions::CONNECT,
                        kind: PermissionOverwriteType::Member(user_id),
                    },
                )
                .await?;
                ctx.say(format!(
                    "<@{}> has been denied access to your channel.",
                    user_id.get()
                ))
                .await
            }
            Some("help") => {
                let prefix = &ctx.config.prefix;
                ctx.reply(
                    Response::new().embed(
                        CreateEmbed::new()
                            .title("VoiceMaster Commands")
                            .description(
                                "Use these commands to manage your temporary voice channel.",
                            )
                            .field(
                                "Available Commands",
                                [
                                    format!("`{prefix}vm` - Create a new voice channel"),
                                    format!("`{prefix}vm name <name>` - Rename your channel"),
                                    format!(
                                        "`{prefix}vm limit <number>` - Set user limit (0 for no limit)"
                                    ),
                                    format!("`{prefix}vm lock` - Lock your channel"),
                                    format!("`{prefix}vm unlock` - Unlock your channel"),
                                    format!(
                                        "`{prefix}vm allow <@user/ID>` - Allow a user to join"
                                    ),
                                    format!(
                                        "`{prefix}vm deny <@user/ID>` - Deny a user access"
                                    ),
                                ]
                                .join("\n"),
                                false,
                            )
                            .color(0x3498db),
                    ),
                )
                .await
            }
            Some(_) => {
                ctx.say(format!(
                    "Unknown action. Use `{}vm help` to see available commands.",
                    ctx.config.prefix
                ))
                .await
            }
        }
    }
}
