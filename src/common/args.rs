use lazy_static::lazy_static;
use regex::Regex;
use serenity::all::{RoleId, UserId};

lazy_static! {
    static ref USER_MENTION: Regex = Regex::new(r"^<@!?(\d+)>$").unwrap();
    static ref ROLE_MENTION: Regex = Regex::new(r"^<@&(\d+)>$").unwrap();
}

/// Positional arguments of a prefix command, consumed left to right.
#[derive(Debug, Clone)]
pub struct Args {
    tokens: Vec<String>,
    index: usize,
}

impl Args {
    pub fn new(input: &str) -> Self {
        Args {
            tokens: input.split_whitespace().map(str::to_string).collect(),
            index: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.index).map(String::as_str)
    }

    /// Consumes every remaining token as free text.
    pub fn rest(&mut self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let text = self.tokens[self.index..].join(" ");
        self.index = self.tokens.len();
        Some(text)
    }

    /// A user mention (`<@id>` / `<@!id>`) or a bare id.
    pub fn next_user_id(&mut self) -> Option<UserId> {
        let token = self.peek()?;
        let id = if let Some(captures) = USER_MENTION.captures(token) {
            captures.get(1)?.as_str().parse::<u64>().ok()?
        } else {
            token.parse::<u64>().ok()?
        };
        self.index += 1;
        Some(UserId::new(id))
    }

    /// A role mention (`<@&id>`) or a bare id.
    pub fn next_role_id(&mut self) -> Option<RoleId> {
        let token = self.peek()?;
        let id = if let Some(captures) = ROLE_MENTION.captures(token) {
            captures.get(1)?.as_str().parse::<u64>().ok()?
        } else {
            token.parse::<u64>().ok()?
        };
        self.index += 1;
        Some(RoleId::new(id))
    }
}

impl Iterator for Args {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_and_bare_ids_parse() {
        let mut args = Args::new("<@123> <@!456> 789");
        assert_eq!(args.next_user_id(), Some(UserId::new(123)));
        assert_eq!(args.next_user_id(), Some(UserId::new(456)));
        assert_eq!(args.next_user_id(), Some(UserId::new(789)));
        assert!(args.next_user_id().is_none());
    }

    #[test]
    fn role_mentions_parse() {
        let mut args = Args::new("<@&55> 66 <@77>");
        assert_eq!(args.next_role_id(), Some(RoleId::new(55)));
        assert_eq!(args.next_role_id(), Some(RoleId::new(66)));
        // A user mention is not a role.
        assert!(args.next_role_id().is_none());
    }

    #[test]
    fn failed_parse_does_not_consume() {
        let mut args = Args::new("not-a-user spam");
        assert!(args.next_user_id().is_none());
        assert_eq!(args.next().as_deref(), Some("not-a-user"));
        assert_eq!(args.rest().as_deref(), Some("spam"));
    }

    #[test]
    fn rest_joins_remaining_tokens() {
        let mut args = Args::new("30m being  very rude");
        assert_eq!(args.next().as_deref(), Some("30m"));
        assert_eq!(args.rest().as_deref(), Some("being very rude"));
        assert!(args.rest().is_none());
    }
}
