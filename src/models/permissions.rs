use std::fmt;
use std::str::FromStr;

use serenity::all::{Member, PartialGuild, Permissions, RoleId};

use super::config::GuildConfig;

/// Permissions a command can require. Each maps onto a native Discord
/// permission flag, and each can additionally be granted per role through
/// a guild's fake-permission table.
#[derive(strum::EnumIter, Clone, Copy, Debug)]
pub enum Permission {
    Administrator,
    ManageGuild,
    ManageRoles,
    ManageChannels,
    KickMembers,
    BanMembers,
    ManageMessages,
    ManageNicknames,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Administrator => "administrator",
            Permission::ManageGuild => "manage_guild",
            Permission::ManageRoles => "manage_roles",
            Permission::ManageChannels => "manage_channels",
            Permission::KickMembers => "kick_members",
            Permission::BanMembers => "ban_members",
            Permission::ManageMessages => "manage_messages",
            Permission::ManageNicknames => "manage_nicknames",
        }
    }

    pub fn to_native(self) -> Permissions {
        match self {
            Permission::Administrator => Permissions::ADMINISTRATOR,
            Permission::ManageGuild => Permissions::MANAGE_GUILD,
            Permission::ManageRoles => Permissions::MANAGE_ROLES,
            Permission::ManageChannels => Permissions::MANAGE_CHANNELS,
            Permission::KickMembers => Permissions::KICK_MEMBERS,
            Permission::BanMembers => Permissions::BAN_MEMBERS,
            Permission::ManageMessages => Permissions::MANAGE_MESSAGES,
            Permission::ManageNicknames => Permissions::MANAGE_NICKNAMES,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "administrator" => Ok(Permission::Administrator),
            "manage_guild" => Ok(Permission::ManageGuild),
            "manage_roles" => Ok(Permission::ManageRoles),
            "manage_channels" => Ok(Permission::ManageChannels),
            "kick_members" => Ok(Permission::KickMembers),
            "ban_members" => Ok(Permission::BanMembers),
            "manage_messages" => Ok(Permission::ManageMessages),
            "manage_nicknames" => Ok(Permission::ManageNicknames),
            _ => Err(()),
        }
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// The member's effective native permissions: the union of their role
/// permissions, widened to everything for the guild owner and for
/// administrators.
pub fn native_permissions(guild: &PartialGuild, member: &Member) -> Permissions {
    if guild.owner_id == member.user.id {
        return Permissions::all();
    }

    let everyone = RoleId::new(guild.id.get());
    let mut permissions = guild
        .roles
        .get(&everyone)
        .map(|role| role.permissions)
        .unwrap_or_else(Permissions::empty);
    for role_id in &member.roles {
        if let Some(role) = guild.roles.get(role_id) {
            permissions |= role.permissions;
        }
    }

    if permissions.contains(Permissions::ADMINISTRATOR) {
        Permissions::all()
    } else {
        permissions
    }
}

/// Decides whether an actor may run a command guarded by `required`.
///
/// Native flags win first: holding the flag itself, or administrator,
/// allows outright. Failing that, every role the actor holds is checked
/// against the guild's fake-permission table.
pub fn authorize(
    native: Permissions,
    roles: &[RoleId],
    config: &GuildConfig,
    required: Permission,
) -> bool {
    if native.contains(Permissions::ADMINISTRATOR) || native.contains(required.to_native()) {
        return true;
    }

    let required_name = required.as_str();
    for role_id in roles {
        if let Some(granted) = config.fake_permissions.get(&role_id.to_string()) {
            if granted.iter().any(|name| name == required_name) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn native_flag_allows() {
        let config = GuildConfig::default();
        assert!(authorize(
            Permissions::BAN_MEMBERS,
            &[],
            &config,
            Permission::BanMembers
        ));
    }

    #[test]
    fn administrator_allows_everything() {
        let config = GuildConfig::default();
        for permission in Permission::iter() {
            assert!(authorize(
                Permissions::ADMINISTRATOR,
                &[],
                &config,
                permission
            ));
        }
    }

    #[test]
    fn fake_permission_allows_through_held_role() {
        let mut config = GuildConfig::default();
        config
            .fake_permissions
            .insert("5".to_string(), vec!["ban_members".to_string()]);

        assert!(authorize(
            Permissions::empty(),
            &[RoleId::new(5)],
            &config,
            Permission::BanMembers
        ));
        // A role the actor does not hold grants nothing.
        assert!(!authorize(
            Permissions::empty(),
            &[RoleId::new(6)],
            &config,
            Permission::BanMembers
        ));
    }

    #[test]
    fn denied_without_flag_or_override() {
        let config = GuildConfig::default();
        assert!(!authorize(
            Permissions::SEND_MESSAGES,
            &[RoleId::new(1)],
            &config,
            Permission::KickMembers
        ));
    }

    #[test]
    fn names_round_trip() {
        for permission in Permission::iter() {
            assert_eq!(
                permission.as_str().parse::<Permission>().ok(),
                Some(permission)
            );
        }
        assert!("moderate_everything".parse::<Permission>().is_err());
    }
}
