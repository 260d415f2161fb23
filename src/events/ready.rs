use serenity::{gateway::ActivityData, model::prelude::Ready, prelude::Context};
use tracing::info;

use crate::models::handler::Handler;

impl Handler {
    pub async fn on_ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);
        info!("Bot ID: {}", ready.user.id.get());

        ctx.set_activity(Some(ActivityData::watching("the exercise yard")));
    }
}
