use std::{path::PathBuf, sync::Arc};

use serenity::{all::UserId, prelude::Context as IncomingContext};

use crate::{
    common::logging::DiscordActionLogger,
    moderation::{engine::ModerationEngine, platform::DiscordPlatform},
    storage::store::ConfigStore,
};

/// Bot-wide settings gathered once at startup and injected everywhere,
/// instead of living in ambient globals.
#[derive(Clone)]
pub struct BotContext {
    pub owner_id: UserId,
    pub data_dir: PathBuf,
}

pub struct Handler {
    pub store: Arc<ConfigStore>,
    pub context: BotContext,
}

impl Handler {
    pub fn new(context: BotContext) -> Self {
        Handler {
            store: Arc::new(ConfigStore::new(context.data_dir.clone())),
            context,
        }
    }

    /// A moderation engine bound to this event's HTTP client. The engine
    /// itself only holds Arcs, so scheduled reversals it spawns keep
    /// working after the invoking event is long gone.
    pub fn engine(&self, ctx: &IncomingContext) -> Arc<ModerationEngine> {
        let platform = Arc::new(DiscordPlatform::new(ctx.http.clone()));
        let logger = Arc::new(DiscordActionLogger::new(
            ctx.http.clone(),
            self.store.clone(),
        ));
        Arc::new(ModerationEngine::new(
            self.store.clone(),
            platform,
            logger,
            ctx.cache.current_user().id,
        ))
    }
}
