use std::fmt;

use serenity::all::{Member, PartialGuild, Permissions};

/// Why a moderation action was refused on role-hierarchy grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyDenial {
    BotRoleTooLow,
    ActorRoleTooLow,
}

impl fmt::Display for HierarchyDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyDenial::BotRoleTooLow => f.write_str(
                "My role is too low to perform this action. Please move the bot's role higher in the server hierarchy.",
            ),
            HierarchyDenial::ActorRoleTooLow => {
                f.write_str("You cannot moderate a member with an equal or higher role than yours.")
            }
        }
    }
}

/// Both the bot and the actor must sit strictly above the target. The
/// bot's position is checked first, so a denial names the actionable
/// problem (move the bot's role) before blaming the invoker.
pub fn check(actor_top: u16, bot_top: u16, target_top: u16) -> Result<(), HierarchyDenial> {
    if bot_top <= target_top {
        return Err(HierarchyDenial::BotRoleTooLow);
    }
    if actor_top <= target_top {
        return Err(HierarchyDenial::ActorRoleTooLow);
    }
    Ok(())
}

/// Position of a member's highest role. The guild owner outranks
/// everyone, an administrator outranks everything but the owner.
pub fn top_role_position(guild: &PartialGuild, member: &Member) -> u16 {
    if guild.owner_id == member.user.id {
        return u16::MAX;
    }

    let mut highest_role = 0;
    for role_id in &member.roles {
        if let Some(role) = guild.roles.get(role_id) {
            if role.permissions.contains(Permissions::ADMINISTRATOR) {
                return u16::MAX - 1;
            }

            if role.position > highest_role {
                highest_role = role.position;
            }
        }
    }

    highest_role
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_below_target_is_denied_regardless_of_actor() {
        assert_eq!(check(5, 3, 4), Err(HierarchyDenial::BotRoleTooLow));
    }

    #[test]
    fn actor_at_or_below_target_is_denied() {
        assert_eq!(check(4, 10, 4), Err(HierarchyDenial::ActorRoleTooLow));
        assert_eq!(check(2, 10, 4), Err(HierarchyDenial::ActorRoleTooLow));
    }

    #[test]
    fn strictly_higher_on_both_counts_is_allowed() {
        assert_eq!(check(5, 6, 4), Ok(()));
    }

    #[test]
    fn equal_bot_and_target_is_denied() {
        assert_eq!(check(9, 4, 4), Err(HierarchyDenial::BotRoleTooLow));
    }
}
