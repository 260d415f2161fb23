pub mod engine;
pub mod platform;

/// Everything the action logger can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Ban,
    Unban,
    Kick,
    Mute,
    Unmute,
    Jail,
    Unjail,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Ban => "ban",
            ActionKind::Unban => "unban",
            ActionKind::Kick => "kick",
            ActionKind::Mute => "mute",
            ActionKind::Unmute => "unmute",
            ActionKind::Jail => "jail",
            ActionKind::Unjail => "unjail",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ActionKind::Ban => "Ban",
            ActionKind::Unban => "Unban",
            ActionKind::Kick => "Kick",
            ActionKind::Mute => "Mute",
            ActionKind::Unmute => "Unmute",
            ActionKind::Jail => "Jail",
            ActionKind::Unjail => "Unjail",
        }
    }

    pub fn color(self) -> u32 {
        match self {
            ActionKind::Ban => 0x992d22,
            ActionKind::Kick => 0xe67e22,
            ActionKind::Mute => 0xf1c40f,
            ActionKind::Jail => 0xe74c3c,
            ActionKind::Unban | ActionKind::Unmute | ActionKind::Unjail => 0x2ecc71,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The temporary-action kinds a scheduled or manual reversal can undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReversibleAction {
    Ban,
    Mute,
    Jail,
}

impl ReversibleAction {
    /// The log entry written when this action is undone.
    pub fn reversal_kind(self) -> ActionKind {
        match self {
            ReversibleAction::Ban => ActionKind::Unban,
            ReversibleAction::Mute => ActionKind::Unmute,
            ReversibleAction::Jail => ActionKind::Unjail,
        }
    }
}

impl std::fmt::Display for ReversibleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReversibleAction::Ban => f.write_str("ban"),
            ReversibleAction::Mute => f.write_str("mute"),
            ReversibleAction::Jail => f.write_str("jail"),
        }
    }
}
