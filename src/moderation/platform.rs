use std::{fmt, sync::Arc};

use serenity::{
    all::{ChannelId, ChannelType, GuildId, RoleId, UserId},
    builder::{CreateChannel, EditMember},
    http::{Http, HttpError},
};

/// Outcome classification for platform-side effects. `Forbidden` and
/// `NotFound` carry remediation meaning for the invoker; everything else
/// is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    Forbidden,
    NotFound,
    Other(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Forbidden => f.write_str("forbidden"),
            PlatformError::NotFound => f.write_str("not found"),
            PlatformError::Other(detail) => f.write_str(detail),
        }
    }
}

/// Maps a serenity error onto the taxonomy the rest of the bot reports.
pub fn classify(err: serenity::Error) -> PlatformError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(ref response)) = err {
        match response.status_code.as_u16() {
            403 => return PlatformError::Forbidden,
            404 => return PlatformError::NotFound,
            _ => {}
        }
    }
    PlatformError::Other(err.to_string())
}

/// The guild-mutating surface the moderation engine drives. Commands and
/// scheduled reversals only ever touch the platform through this trait,
/// which keeps the engine testable against a recorded fake.
#[async_trait::async_trait]
pub trait PlatformActions: Send + Sync {
    async fn ban(&self, guild: GuildId, user: UserId, reason: &str) -> Result<(), PlatformError>;

    async fn unban(&self, guild: GuildId, user: UserId, reason: &str) -> Result<(), PlatformError>;

    async fn kick(&self, guild: GuildId, user: UserId, reason: &str) -> Result<(), PlatformError>;

    /// Roles the member currently holds, as the platform sees them.
    async fn member_roles(&self, guild: GuildId, user: UserId)
        -> Result<Vec<RoleId>, PlatformError>;

    async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn add_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn remove_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
        reason: &str,
    ) -> Result<(), PlatformError>;

    /// Replaces the member's entire role set.
    async fn replace_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError>;

    /// Moves the member to a voice channel, or disconnects them with
    /// `None`.
    async fn move_member(
        &self,
        guild: GuildId,
        user: UserId,
        channel: Option<ChannelId>,
    ) -> Result<(), PlatformError>;

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
        category: Option<ChannelId>,
    ) -> Result<ChannelId, PlatformError>;

    async fn delete_channel(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<(), PlatformError>;
}

/// Discord-backed implementation over serenity's HTTP client.
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordPlatform { http }
    }
}

#[async_trait::async_trait]
impl PlatformActions for DiscordPlatform {
    async fn ban(&self, guild: GuildId, user: UserId, reason: &str) -> Result<(), PlatformError> {
        self.http
            .ban_user(guild, user, 0, Some(reason))
            .await
            .map_err(classify)
    }

    async fn unban(&self, guild: GuildId, user: UserId, reason: &str) -> Result<(), PlatformError> {
        self.http
            .remove_ban(guild, user, Some(reason))
            .await
            .map_err(classify)
    }

    async fn kick(&self, guild: GuildId, user: UserId, reason: &str) -> Result<(), PlatformError> {
        self.http
            .kick_member(guild, user, Some(reason))
            .await
            .map_err(classify)
    }

    async fn member_roles(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Vec<RoleId>, PlatformError> {
        let member = self.http.get_member(guild, user).await.map_err(classify)?;
        Ok(member.roles)
    }

    async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.http
            .add_member_role(guild, user, role, Some(reason))
            .await
            .map_err(classify)
    }

    async fn add_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError> {
        let member = self.http.get_member(guild, user).await.map_err(classify)?;
        let mut combined = member.roles;
        for role in roles {
            if !combined.contains(role) {
                combined.push(*role);
            }
        }
        guild
            .edit_member(
                &self.http,
                user,
                EditMember::new().roles(combined).audit_log_reason(reason),
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.http
            .remove_member_role(guild, user, role, Some(reason))
            .await
            .map_err(classify)
    }

    async fn replace_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError> {
        guild
            .edit_member(
                &self.http,
                user,
                EditMember::new()
                    .roles(roles.to_vec())
                    .audit_log_reason(reason),
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn move_member(
        &self,
        guild: GuildId,
        user: UserId,
        channel: Option<ChannelId>,
    ) -> Result<(), PlatformError> {
        let edit = match channel {
            Some(channel) => EditMember::new().voice_channel(channel),
            None => EditMember::new().disconnect_member(),
        };
        guild
            .edit_member(&self.http, user, edit)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
        category: Option<ChannelId>,
    ) -> Result<ChannelId, PlatformError> {
        let mut builder = CreateChannel::new(name).kind(ChannelType::Voice);
        if let Some(category) = category {
            builder = builder.category(category);
        }
        let channel = guild
            .create_channel(&self.http, builder)
            .await
            .map_err(classify)?;
        Ok(channel.id)
    }

    async fn delete_channel(
        &self,
        _guild: GuildId,
        channel: ChannelId,
    ) -> Result<(), PlatformError> {
        self.http
            .delete_channel(channel, None)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use std::{
        collections::{HashMap, HashSet},
        sync::atomic::{AtomicU64, Ordering},
        sync::Mutex,
    };

    use super::*;

    /// In-memory platform for engine tests. Role and ban state behaves
    /// like the real platform: reads reflect previous writes, unbanning a
    /// non-banned member is `NotFound`, an unknown member is `NotFound`.
    #[derive(Default)]
    pub struct MockPlatform {
        pub roles: Mutex<HashMap<(GuildId, UserId), Vec<RoleId>>>,
        pub bans: Mutex<HashSet<(GuildId, UserId)>>,
        pub kicked: Mutex<Vec<(GuildId, UserId)>>,
        pub moved: Mutex<Vec<(UserId, Option<ChannelId>)>>,
        pub deleted_channels: Mutex<Vec<ChannelId>>,
        next_channel: AtomicU64,
    }

    impl MockPlatform {
        pub fn new() -> Self {
            MockPlatform {
                next_channel: AtomicU64::new(9000),
                ..MockPlatform::default()
            }
        }

        pub fn with_member(self, guild: GuildId, user: UserId, roles: Vec<RoleId>) -> Self {
            self.roles.lock().unwrap().insert((guild, user), roles);
            self
        }

        pub fn member_role_set(&self, guild: GuildId, user: UserId) -> Vec<RoleId> {
            self.roles
                .lock()
                .unwrap()
                .get(&(guild, user))
                .cloned()
                .unwrap_or_default()
        }

        pub fn is_banned(&self, guild: GuildId, user: UserId) -> bool {
            self.bans.lock().unwrap().contains(&(guild, user))
        }
    }

    #[async_trait::async_trait]
    impl PlatformActions for MockPlatform {
        async fn ban(
            &self,
            guild: GuildId,
            user: UserId,
            _reason: &str,
        ) -> Result<(), PlatformError> {
            self.bans.lock().unwrap().insert((guild, user));
            Ok(())
        }

        async fn unban(
            &self,
            guild: GuildId,
            user: UserId,
            _reason: &str,
        ) -> Result<(), PlatformError> {
            if self.bans.lock().unwrap().remove(&(guild, user)) {
                Ok(())
            } else {
                Err(PlatformError::NotFound)
            }
        }

        async fn kick(
            &self,
            guild: GuildId,
            user: UserId,
            _reason: &str,
        ) -> Result<(), PlatformError> {
            self.kicked.lock().unwrap().push((guild, user));
            Ok(())
        }

        async fn member_roles(
            &self,
            guild: GuildId,
            user: UserId,
        ) -> Result<Vec<RoleId>, PlatformError> {
            self.roles
                .lock()
                .unwrap()
                .get(&(guild, user))
                .cloned()
                .ok_or(PlatformError::NotFound)
        }

        async fn add_role(
            &self,
            guild: GuildId,
            user: UserId,
            role: RoleId,
            _reason: &str,
        ) -> Result<(), PlatformError> {
            let mut roles = self.roles.lock().unwrap();
            let entry = roles.entry((guild, user)).or_default();
            if !entry.contains(&role) {
                entry.push(role);
            }
            Ok(())
        }

        async fn add_roles(
            &self,
            guild: GuildId,
            user: UserId,
            to_add: &[RoleId],
            _reason: &str,
        ) -> Result<(), PlatformError> {
            let mut roles = self.roles.lock().unwrap();
            let entry = roles.entry((guild, user)).or_default();
            for role in to_add {
                if !entry.contains(role) {
                    entry.push(*role);
                }
            }
            Ok(())
        }

        async fn remove_role(
            &self,
            guild: GuildId,
            user: UserId,
            role: RoleId,
            _reason: &str,
        ) -> Result<(), PlatformError> {
            let mut roles = self.roles.lock().unwrap();
            if let Some(entry) = roles.get_mut(&(guild, user)) {
                entry.retain(|held| *held != role);
            }
            Ok(())
        }

        async fn replace_roles(
            &self,
            guild: GuildId,
            user: UserId,
            new_roles: &[RoleId],
            _reason: &str,
        ) -> Result<(), PlatformError> {
            self.roles
                .lock()
                .unwrap()
                .insert((guild, user), new_roles.to_vec());
            Ok(())
        }

        async fn move_member(
            &self,
            _guild: GuildId,
            user: UserId,
            channel: Option<ChannelId>,
        ) -> Result<(), PlatformError> {
            self.moved.lock().unwrap().push((user, channel));
            Ok(())
        }

        async fn create_voice_channel(
            &self,
            _guild: GuildId,
            _name: &str,
            _category: Option<ChannelId>,
        ) -> Result<ChannelId, PlatformError> {
            let id = self.next_channel.fetch_add(1, Ordering::Relaxed);
            Ok(ChannelId::new(id))
        }

        async fn delete_channel(
            &self,
            _guild: GuildId,
            channel: ChannelId,
        ) -> Result<(), PlatformError> {
            self.deleted_channels.lock().unwrap().push(channel);
            Ok(())
        }
    }
}
