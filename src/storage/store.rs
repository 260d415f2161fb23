use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex as StdMutex},
};

use serenity::all::GuildId;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::config::{GlobalConfig, GuildConfig};

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "I/O error: {err}"),
            StorageError::Serde(err) => write!(f, "serialization error: {err}"),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Serde(value)
    }
}

/// Durable per-guild and global settings, one JSON record each.
///
/// All mutation runs under a per-guild lock so two concurrent
/// read-modify-write operations on the same guild cannot overwrite each
/// other's changes. Records are written to a temp file and renamed into
/// place, so a crash never leaves a half-written record behind.
pub struct ConfigStore {
    data_dir: PathBuf,
    guild_locks: StdMutex<HashMap<u64, Arc<Mutex<()>>>>,
    global_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        ConfigStore {
            data_dir: data_dir.into(),
            guild_locks: StdMutex::new(HashMap::new()),
            global_lock: Mutex::new(()),
        }
    }

    fn guild_path(&self, guild_id: GuildId) -> PathBuf {
        self.data_dir.join("guilds").join(format!("{guild_id}.json"))
    }

    fn global_path(&self) -> PathBuf {
        self.data_dir.join("bot_config.json")
    }

    fn lock_for(&self, guild_id: GuildId) -> Arc<Mutex<()>> {
        let mut locks = self.guild_locks.lock().unwrap();
        locks
            .entry(guild_id.get())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Returns the guild's persisted configuration, synthesizing and
    /// persisting the default record on first access.
    pub async fn get_guild(&self, guild_id: GuildId) -> Result<GuildConfig, StorageError> {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;
        self.load_guild_locked(guild_id).await
    }

    /// Fully overwrites the guild's persisted record.
    pub async fn save_guild(
        &self,
        guild_id: GuildId,
        config: &GuildConfig,
    ) -> Result<(), StorageError> {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;
        write_record(&self.guild_path(guild_id), config).await
    }

    /// Read-modify-write under the guild's lock. This is the only safe
    /// way to patch a single field while other commands may be mutating
    /// the same guild.
    pub async fn update_guild<T, F>(&self, guild_id: GuildId, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut GuildConfig) -> T + Send,
        T: Send,
    {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;

        let mut config = self.load_guild_locked(guild_id).await?;
        let result = f(&mut config);
        write_record(&self.guild_path(guild_id), &config).await?;
        Ok(result)
    }

    pub async fn get_global(&self) -> Result<GlobalConfig, StorageError> {
        let _guard = self.global_lock.lock().await;
        self.load_global_locked().await
    }

    pub async fn update_global<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut GlobalConfig) -> T + Send,
        T: Send,
    {
        let _guard = self.global_lock.lock().await;

        let mut config = self.load_global_locked().await?;
        let result = f(&mut config);
        write_record(&self.global_path(), &config).await?;
        Ok(result)
    }

    async fn load_guild_locked(&self, guild_id: GuildId) -> Result<GuildConfig, StorageError> {
        let path = self.guild_path(guild_id);
        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No record for guild {guild_id}, persisting defaults");
                let config = GuildConfig::default();
                write_record(&path, &config).await?;
                Ok(config)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn load_global_locked(&self) -> Result<GlobalConfig, StorageError> {
        let path = self.global_path();
        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No global record, persisting defaults");
                let config = GlobalConfig::default();
                write_record(&path, &config).await?;
                Ok(config)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Write to a temp file in the same directory, then rename into place.
async fn write_record<T: serde::Serialize>(path: &Path, record: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let raw = serde_json::to_vec_pretty(record)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &raw).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), "Record saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::MuteConfig;
    use serenity::all::RoleId;

    #[tokio::test]
    async fn first_access_persists_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let guild = GuildId::new(1000);

        let first = store.get_guild(guild).await.unwrap();
        assert_eq!(first, GuildConfig::default());

        // The record now exists on disk and loads back identically.
        assert!(dir.path().join("guilds").join("1000.json").exists());
        let second = store.get_guild(guild).await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn save_overwrites_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let guild = GuildId::new(7);

        let mut config = store.get_guild(guild).await.unwrap();
        config.prefix = "?".to_string();
        config.aliases.insert("b".to_string(), "ban".to_string());
        store.save_guild(guild, &config).await.unwrap();

        let reloaded = store.get_guild(guild).await.unwrap();
        assert_eq!(reloaded.prefix, "?");
        assert_eq!(reloaded.resolve_alias("b"), Some("ban"));

        store.save_guild(guild, &GuildConfig::default()).await.unwrap();
        let reset = store.get_guild(guild).await.unwrap();
        assert_eq!(reset, GuildConfig::default());
    }

    #[tokio::test]
    async fn concurrent_disjoint_updates_both_survive() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(ConfigStore::new(dir.path()));
        let guild = GuildId::new(55);

        let adds_alias = {
            let store = store.clone();
            async move {
                store
                    .update_guild(guild, |config| {
                        config.aliases.insert("b".to_string(), "ban".to_string());
                    })
                    .await
            }
        };
        let grants_permission = {
            let store = store.clone();
            async move {
                store
                    .update_guild(guild, |config| {
                        config
                            .fake_permissions
                            .entry("9".to_string())
                            .or_default()
                            .push("ban_members".to_string());
                    })
                    .await
            }
        };

        let (left, right) = tokio::join!(adds_alias, grants_permission);
        left.unwrap();
        right.unwrap();

        let config = store.get_guild(guild).await.unwrap();
        assert_eq!(config.resolve_alias("b"), Some("ban"));
        assert_eq!(
            config.fake_permissions.get("9"),
            Some(&vec!["ban_members".to_string()])
        );
    }

    #[tokio::test]
    async fn update_returns_closure_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let guild = GuildId::new(3);

        let previous = store
            .update_guild(guild, |config| {
                config.mute = Some(MuteConfig {
                    muted_role_id: RoleId::new(12),
                });
                config.user_roles.remove("404")
            })
            .await
            .unwrap();
        assert!(previous.is_none());

        let config = store.get_guild(guild).await.unwrap();
        assert_eq!(
            config.mute,
            Some(MuteConfig {
                muted_role_id: RoleId::new(12)
            })
        );
    }

    #[tokio::test]
    async fn global_record_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        let initial = store.get_global().await.unwrap();
        assert!(initial.whitelisted_guilds.is_empty());

        store
            .update_global(|config| {
                config.whitelisted_guilds.insert("42".to_string());
            })
            .await
            .unwrap();

        let reloaded = store.get_global().await.unwrap();
        assert!(reloaded.permits(GuildId::new(42)));
        assert!(!reloaded.permits(GuildId::new(41)));
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let guild = GuildId::new(21);

        store
            .update_guild(guild, |config| config.prefix = ".".to_string())
            .await
            .unwrap();

        let mut entries = tokio::fs::read_dir(dir.path().join("guilds")).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name();
            assert!(!name.to_string_lossy().ends_with(".tmp"), "{name:?}");
        }
    }
}
