use serenity::{all::Guild, prelude::Context as IncomingContext};
use tracing::{error, info};

use crate::models::handler::Handler;

impl Handler {
    pub async fn on_guild_create(&self, ctx: IncomingContext, guild: Guild) {
        let permitted = match self.store.get_global().await {
            Ok(global) => global.permits(guild.id),
            Err(err) => {
                error!("Failed to load the global configuration: {err}");
                true
            }
        };

        if !permitted {
            info!(
                "Leaving non-whitelisted guild {} ({})",
                guild.name,
                guild.id.get()
            );
            if let Ok(channel) = guild.owner_id.create_dm_channel(&ctx.http).await {
                let _ = channel
                    .id
                    .say(
                        &ctx.http,
                        "This bot only operates in whitelisted servers. Contact the bot owner to request access.",
                    )
                    .await;
            }
            if let Err(err) = guild.id.leave(&ctx.http).await {
                error!("Failed to leave guild {}: {err}", guild.id.get());
            }
            return;
        }

        info!("Joined guild {} ({})", guild.name, guild.id.get());

        // Materializes and persists the default record.
        if let Err(err) = self.store.get_guild(guild.id).await {
            error!(
                "Failed to create a configuration for guild {}: {err}",
                guild.id.get()
            );
        }
    }
}
