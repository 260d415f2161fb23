use serenity::all::{ChannelId, GuildId, UserId};

use crate::{
    models::{config::GuildConfig, response::ResponseError},
    moderation::platform::PlatformActions,
    storage::store::ConfigStore,
};

fn not_set_up() -> ResponseError {
    ResponseError::Execution(
        "VoiceMaster is not set up!",
        Some("Ask an administrator to run the `vm setup` command first.".to_string()),
    )
}

/// Whether `channel_id` is a temporary channel owned by `user`.
pub fn owns_channel(config: &GuildConfig, channel_id: ChannelId, user: UserId) -> bool {
    let Some(vm) = &config.voice_master else {
        return false;
    };
    vm.enabled && vm.user_channels.get(&channel_id.to_string()) == Some(&user)
}

/// Whether `channel_id` is the configured join-to-create channel.
pub fn is_join_channel(config: &GuildConfig, channel_id: ChannelId) -> bool {
    config
        .voice_master
        .as_ref()
        .is_some_and(|vm| vm.enabled && vm.join_channel_id == channel_id)
}

/// Creates a temporary voice channel in the configured category, moves
/// the owner into it and records the ownership mapping.
pub async fn create_user_channel(
    store: &ConfigStore,
    platform: &dyn PlatformActions,
    guild_id: GuildId,
    owner: UserId,
    display_name: &str,
) -> Result<ChannelId, ResponseError> {
    let config = store.get_guild(guild_id).await?;
    let Some(vm) = config.voice_master else {
        return Err(not_set_up());
    };
    if !vm.enabled {
        return Err(not_set_up());
    }

    let channel = platform
        .create_voice_channel(
            guild_id,
            &format!("{display_name}'s Channel"),
            Some(vm.category_id),
        )
        .await?;
    platform.move_member(guild_id, owner, Some(channel)).await?;

    store
        .update_guild(guild_id, |config| {
            if let Some(vm) = config.voice_master.as_mut() {
                vm.user_channels.insert(channel.to_string(), owner);
            }
        })
        .await?;

    Ok(channel)
}

/// Deletes a tracked temporary channel and forgets its owner. Returns
/// `false` when the channel was not one of ours, which callers treat as
/// "nothing to do".
pub async fn release_user_channel(
    store: &ConfigStore,
    platform: &dyn PlatformActions,
    guild_id: GuildId,
    channel_id: ChannelId,
) -> Result<bool, ResponseError> {
    let tracked = store
        .update_guild(guild_id, |config| {
            config.voice_master.as_mut().is_some_and(|vm| {
                vm.user_channels.remove(&channel_id.to_string()).is_some()
            })
        })
        .await?;
    if !tracked {
        return Ok(false);
    }

    platform.delete_channel(guild_id, channel_id).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::VoiceMasterConfig;
    use crate::moderation::platform::mock::MockPlatform;
    use std::collections::HashMap;

    const GUILD: GuildId = GuildId::new(30);
    const OWNER: UserId = UserId::new(400);

    async fn configured_store(dir: &tempfile::TempDir) -> ConfigStore {
        let store = ConfigStore::new(dir.path());
        store
            .update_guild(GUILD, |config| {
                config.voice_master = Some(VoiceMasterConfig {
                    enabled: true,
                    join_channel_id: ChannelId::new(801),
                    category_id: ChannelId::new(802),
                    user_channels: HashMap::new(),
                });
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn create_moves_owner_and_records_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let store = configured_store(&dir).await;
        let platform = MockPlatform::new();

        let channel = create_user_channel(&store, &platform, GUILD, OWNER, "kam")
            .await
            .unwrap();

        assert_eq!(
            platform.moved.lock().unwrap().as_slice(),
            &[(OWNER, Some(channel))]
        );

        let config = store.get_guild(GUILD).await.unwrap();
        assert!(owns_channel(&config, channel, OWNER));
        assert!(!owns_channel(&config, channel, UserId::new(401)));
    }

    #[tokio::test]
    async fn create_without_setup_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let platform = MockPlatform::new();

        let result = create_user_channel(&store, &platform, GUILD, OWNER, "kam").await;
        assert!(matches!(
            result,
            Err(ResponseError::Execution("VoiceMaster is not set up!", _))
        ));
    }

    #[tokio::test]
    async fn release_deletes_tracked_channels_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = configured_store(&dir).await;
        let platform = MockPlatform::new();

        let channel = create_user_channel(&store, &platform, GUILD, OWNER, "kam")
            .await
            .unwrap();

        // An untracked channel is ignored.
        let untracked = release_user_channel(&store, &platform, GUILD, ChannelId::new(12345))
            .await
            .unwrap();
        assert!(!untracked);
        assert!(platform.deleted_channels.lock().unwrap().is_empty());

        let released = release_user_channel(&store, &platform, GUILD, channel)
            .await
            .unwrap();
        assert!(released);
        assert_eq!(platform.deleted_channels.lock().unwrap().as_slice(), &[channel]);

        let config = store.get_guild(GUILD).await.unwrap();
        assert!(!owns_channel(&config, channel, OWNER));
    }

    #[tokio::test]
    async fn join_channel_detection_requires_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = configured_store(&dir).await;

        let config = store.get_guild(GUILD).await.unwrap();
        assert!(is_join_channel(&config, ChannelId::new(801)));
        assert!(!is_join_channel(&config, ChannelId::new(802)));

        store
            .update_guild(GUILD, |config| {
                if let Some(vm) = config.voice_master.as_mut() {
                    vm.enabled = false;
                }
            })
            .await
            .unwrap();
        let config = store.get_guild(GUILD).await.unwrap();
        assert!(!is_join_channel(&config, ChannelId::new(801)));
    }
}
