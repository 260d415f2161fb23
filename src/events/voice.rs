use serenity::{all::VoiceState, prelude::Context as IncomingContext};
use tracing::{debug, error};

use crate::{
    models::handler::Handler, moderation::platform::DiscordPlatform, voice::provision,
};

impl Handler {
    /// Voice-state changes drive VoiceMaster directly: joining the
    /// join-to-create channel provisions a temporary channel, and leaving
    /// a temporary channel empty tears it down. No command invocation is
    /// fabricated for either path.
    pub async fn on_voice_state_update(
        &self,
        ctx: IncomingContext,
        old: Option<VoiceState>,
        new: VoiceState,
    ) {
        if new.member.as_ref().is_some_and(|member| member.user.bot) {
            return;
        }

        if let (Some(guild_id), Some(channel_id)) = (new.guild_id, new.channel_id) {
            match self.store.get_guild(guild_id).await {
                Ok(config) if provision::is_join_channel(&config, channel_id) => {
                    let display_name = new
                        .member
                        .as_ref()
                        .map_or_else(|| new.user_id.to_string(), |member| {
                            member.display_name().to_string()
                        });
                    let platform = DiscordPlatform::new(ctx.http.clone());
                    if let Err(err) = provision::create_user_channel(
                        &self.store,
                        &platform,
                        guild_id,
                        new.user_id,
                        &display_name,
                    )
                    .await
                    {
                        debug!(
                            "Failed to provision a temporary channel in guild {}: {err:?}",
                            guild_id.get()
                        );
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    error!(
                        "Failed to load configuration for guild {}: {err}",
                        guild_id.get()
                    );
                }
            }
        }

        let Some(old) = old else {
            return;
        };
        let (Some(guild_id), Some(before_channel)) = (old.guild_id, old.channel_id) else {
            return;
        };
        if new.channel_id == Some(before_channel) {
            return;
        }

        let config = match self.store.get_guild(guild_id).await {
            Ok(config) => config,
            Err(err) => {
                error!(
                    "Failed to load configuration for guild {}: {err}",
                    guild_id.get()
                );
                return;
            }
        };
        let tracked = config.voice_master.as_ref().is_some_and(|vm| {
            vm.user_channels.contains_key(&before_channel.to_string())
        });
        if !tracked {
            return;
        }

        // Only tear the channel down once the last member has left, going
        // by what the cache currently says.
        let still_occupied = ctx
            .cache
            .guild(guild_id)
            .map(|guild| {
                guild
                    .voice_states
                    .values()
                    .any(|state| state.channel_id == Some(before_channel))
            })
            .unwrap_or(true);
        if still_occupied {
            return;
        }

        let platform = DiscordPlatform::new(ctx.http.clone());
        match provision::release_user_channel(&self.store, &platform, guild_id, before_channel)
            .await
        {
            Ok(true) => debug!(
                "Released empty temporary channel {} in guild {}",
                before_channel.get(),
                guild_id.get()
            ),
            Ok(false) => {}
            Err(err) => debug!(
                "Failed to release temporary channel {}: {err:?}",
                before_channel.get()
            ),
        }
    }
}
