use std::collections::{HashMap, HashSet};

use serde_derive::{Deserialize, Serialize};
use serenity::all::{ChannelId, GuildId, RoleId, UserId};

pub const DEFAULT_PREFIX: &str = "!";

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JailConfig {
    pub jailed_role_id: RoleId,
    pub jail_channel_id: ChannelId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MuteConfig {
    pub muted_role_id: RoleId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceMasterConfig {
    pub enabled: bool,
    pub join_channel_id: ChannelId,
    pub category_id: ChannelId,
    /// Temporary channel id (decimal string) -> owning member.
    #[serde(default)]
    pub user_channels: HashMap<String, UserId>,
}

/// Per-guild persisted settings. Absence of any field deserializes to its
/// default, so records written by older versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuildConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub jail: Option<JailConfig>,
    #[serde(default)]
    pub mute: Option<MuteConfig>,
    /// Role id (decimal string) -> granted permission names.
    #[serde(default)]
    pub fake_permissions: HashMap<String, Vec<String>>,
    /// Alias name -> canonical command name. Last write wins.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub logs_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub jail_logs_channel_id: Option<ChannelId>,
    /// Member id (decimal string) -> roles held before being jailed.
    #[serde(default)]
    pub user_roles: HashMap<String, Vec<RoleId>>,
    #[serde(default)]
    pub voice_master: Option<VoiceMasterConfig>,
}

impl Default for GuildConfig {
    fn default() -> Self {
        GuildConfig {
            prefix: default_prefix(),
            jail: None,
            mute: None,
            fake_permissions: HashMap::new(),
            aliases: HashMap::new(),
            logs_channel_id: None,
            jail_logs_channel_id: None,
            user_roles: HashMap::new(),
            voice_master: None,
        }
    }
}

impl GuildConfig {
    /// Rewrites a typed command name through the guild's alias table.
    ///
    /// The lookup is a single hop: an alias pointing at another alias is
    /// not followed, the target is handed to the dispatcher as a literal
    /// command name.
    pub fn resolve_alias(&self, typed: &str) -> Option<&str> {
        self.aliases.get(typed).map(String::as_str)
    }
}

/// Bot-wide persisted settings, a single record for the whole process.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    #[serde(default)]
    pub whitelisted_guilds: HashSet<String>,
}

impl GlobalConfig {
    /// An empty whitelist means no restriction at all; only a non-empty
    /// set narrows the bot down to the listed guilds.
    pub fn permits(&self, guild_id: GuildId) -> bool {
        self.whitelisted_guilds.is_empty()
            || self.whitelisted_guilds.contains(&guild_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_deserializes_to_defaults() {
        let config: GuildConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GuildConfig::default());
        assert_eq!(config.prefix, "!");
        assert!(config.jail.is_none());
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn alias_resolution_is_single_hop() {
        let mut config = GuildConfig::default();
        config.aliases.insert("a".to_string(), "b".to_string());
        config.aliases.insert("b".to_string(), "c".to_string());

        assert_eq!(config.resolve_alias("a"), Some("b"));
        assert_eq!(config.resolve_alias("b"), Some("c"));
        assert_eq!(config.resolve_alias("c"), None);
    }

    #[test]
    fn empty_whitelist_permits_every_guild() {
        let config = GlobalConfig::default();
        assert!(config.permits(GuildId::new(1)));
        assert!(config.permits(GuildId::new(987654321)));
    }

    #[test]
    fn populated_whitelist_permits_only_listed_guilds() {
        let mut config = GlobalConfig::default();
        config.whitelisted_guilds.insert("42".to_string());

        assert!(config.permits(GuildId::new(42)));
        assert!(!config.permits(GuildId::new(43)));
    }

    #[test]
    fn ids_round_trip_as_decimal_strings() {
        let mut config = GuildConfig::default();
        config.mute = Some(MuteConfig {
            muted_role_id: RoleId::new(1041788629250482208),
        });
        config
            .user_roles
            .insert("77".to_string(), vec![RoleId::new(1), RoleId::new(2)]);

        let raw = serde_json::to_string(&config).unwrap();
        assert!(raw.contains("\"1041788629250482208\""));

        let reloaded: GuildConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded, config);
    }
}
