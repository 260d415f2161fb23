use std::sync::Arc;

use serenity::{
    all::{ChannelId, GuildId, Timestamp, UserId},
    builder::{CreateEmbed, CreateMessage},
    http::Http,
};
use tracing::debug;

use crate::{models::config::GuildConfig, moderation::ActionKind, storage::store::ConfigStore};

/// Which configured log channel an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChannelKind {
    General,
    Jail,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub guild_id: GuildId,
    pub action: ActionKind,
    pub user_id: UserId,
    pub moderator_id: UserId,
    pub reason: Option<String>,
    pub duration: Option<String>,
    pub channel: LogChannelKind,
}

pub fn get_log_channel(config: &GuildConfig, kind: LogChannelKind) -> Option<ChannelId> {
    match kind {
        LogChannelKind::General => config.logs_channel_id,
        LogChannelKind::Jail => config.jail_logs_channel_id,
    }
}

/// Records moderation actions somewhere a human can audit them.
/// Logging is best-effort everywhere: a missing channel or a failed send
/// never fails the action that produced the entry.
#[async_trait::async_trait]
pub trait ActionLogger: Send + Sync {
    async fn log(&self, entry: LogEntry);
}

/// Sends embeds to the guild's configured log channels.
pub struct DiscordActionLogger {
    http: Arc<Http>,
    store: Arc<ConfigStore>,
}

impl DiscordActionLogger {
    pub fn new(http: Arc<Http>, store: Arc<ConfigStore>) -> Self {
        DiscordActionLogger { http, store }
    }
}

#[async_trait::async_trait]
impl ActionLogger for DiscordActionLogger {
    async fn log(&self, entry: LogEntry) {
        let config = match self.store.get_guild(entry.guild_id).await {
            Ok(config) => config,
            Err(err) => {
                debug!(
                    "Skipping action log for guild {}: {err}",
                    entry.guild_id.get()
                );
                return;
            }
        };

        let Some(channel) = get_log_channel(&config, entry.channel) else {
            return;
        };

        let mut embed = CreateEmbed::new()
            .title(format!("Moderation Action: {}", entry.action.title()))
            .color(entry.action.color())
            .timestamp(Timestamp::now())
            .field("User", format!("<@{}>", entry.user_id.get()), false)
            .field(
                "Moderator",
                format!("<@{}>", entry.moderator_id.get()),
                false,
            );
        if let Some(duration) = &entry.duration {
            embed = embed.field("Duration", duration.clone(), false);
        }
        if let Some(reason) = &entry.reason {
            embed = embed.field("Reason", reason.clone(), false);
        }

        if let Err(err) = channel
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await
        {
            debug!(
                "Failed to send {} log for guild {}: {err}",
                entry.action,
                entry.guild_id.get()
            );
        }
    }
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Collects entries so tests can assert on exactly what was logged.
    #[derive(Default)]
    pub struct RecordingLogger {
        pub entries: Mutex<Vec<LogEntry>>,
    }

    impl RecordingLogger {
        pub fn new() -> Self {
            RecordingLogger::default()
        }

        pub fn kinds(&self) -> Vec<ActionKind> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .map(|entry| entry.action)
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl ActionLogger for RecordingLogger {
        async fn log(&self, entry: LogEntry) {
            self.entries.lock().unwrap().push(entry);
        }
    }
}
