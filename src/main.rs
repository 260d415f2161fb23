#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::unreadable_literal)]

use serenity::{all::UserId, prelude::GatewayIntents, Client};
use std::env;
use tracing::{error, info};

mod commands;
mod common;
mod events;
mod models;
mod moderation;
mod storage;
mod voice;

use models::handler::{BotContext, Handler};

#[tokio::main]
async fn main() {
    let log_level = match env::var("DEBUG").unwrap_or(false.to_string()).as_str() {
        "true" => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Getting environment variables");
    let discord_token = env::var("DISCORD_TOKEN").unwrap();
    let owner_id: UserId = env::var("BOT_OWNER_ID")
        .expect("BOT_OWNER_ID must be set")
        .parse::<u64>()
        .expect("BOT_OWNER_ID must be a user id")
        .into();
    let data_dir = env::var("DATA_DIR").unwrap_or("data".to_string());

    let handler = Handler::new(BotContext {
        owner_id,
        data_dir: data_dir.into(),
    });

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&discord_token, intents)
        .event_handler(handler)
        .await
        .unwrap();

    if let Err(err) = client.start_autosharded().await {
        error!(
            "Attempted to start the Warden Discord client, but failed with error: {}",
            err
        );
    }
}
