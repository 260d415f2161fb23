use crate::models::command::Command;

pub mod config;
pub mod global;
pub mod info;
pub mod moderation;
pub mod voice;

pub fn get_command_list() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(moderation::ban::BanCommand),
        Box::new(moderation::unban::UnbanCommand),
        Box::new(moderation::kick::KickCommand),
        Box::new(moderation::mute::MuteCommand),
        Box::new(moderation::unmute::UnmuteCommand),
        Box::new(moderation::jail::JailCommand),
        Box::new(moderation::unjail::UnjailCommand),
        Box::new(config::prefix::PrefixCommand),
        Box::new(config::alias::AliasCommand),
        Box::new(config::fake_permissions::FakePermissionsCommand),
        Box::new(config::setup::SetupJailCommand),
        Box::new(config::setup::SetupMuteCommand),
        Box::new(config::setup::SetupLogsCommand),
        Box::new(global::whitelist::WhitelistCommand),
        Box::new(voice::VoiceMasterCommand),
        Box::new(info::HelpCommand),
    ]
}

/// Whether `name` is a real registered command. Alias targets are checked
/// against this at creation time; resolution never re-checks.
pub fn is_registered(name: &str) -> bool {
    get_command_list()
        .iter()
        .any(|command| command.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_are_unique() {
        let commands = get_command_list();
        for (index, command) in commands.iter().enumerate() {
            for other in &commands[index + 1..] {
                assert_ne!(command.name(), other.name());
            }
        }
    }

    #[test]
    fn alias_targets_can_be_validated() {
        assert!(is_registered("ban"));
        assert!(is_registered("vm"));
        assert!(!is_registered("banish"));
    }
}
