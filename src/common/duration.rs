use lazy_static::lazy_static;
use pretty_duration::pretty_duration;
use regex::Regex;
use tracing::debug;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 60 * 60 * 24;
const SECONDS_PER_YEAR: i64 = SECONDS_PER_DAY * 365;

/// How long a moderation action lasts. `permanent` actions never get a
/// scheduled reversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duration {
    pub seconds: i64,
    pub permanent: bool,
    pub string: String,
}

impl Duration {
    /// Parses `infinite` or `<integer><unit>` with unit one of `m`, `h`,
    /// `d`, `y` (a year is exactly 365 days). Returns `None` for any
    /// other form; callers fall back to permanent and warn the invoker.
    pub fn parse(string: &str) -> Option<Duration> {
        debug!("Parsing duration: {}", string);
        let lowered = string.to_lowercase();

        if lowered == "infinite" {
            return Some(Duration::permanent());
        }

        lazy_static! {
            static ref DURATION_REGEX: Regex = Regex::new(r"^(\d+)(m|h|d|y)$").unwrap();
        }

        let captures = DURATION_REGEX.captures(&lowered)?;
        let amount = captures.get(1)?.as_str().parse::<i64>().ok()?;
        let seconds = match captures.get(2)?.as_str() {
            "m" => amount.checked_mul(SECONDS_PER_MINUTE)?,
            "h" => amount.checked_mul(SECONDS_PER_HOUR)?,
            "d" => amount.checked_mul(SECONDS_PER_DAY)?,
            "y" => amount.checked_mul(SECONDS_PER_YEAR)?,
            _ => return None,
        };

        Some(Duration {
            seconds,
            permanent: false,
            string: lowered,
        })
    }

    pub fn permanent() -> Duration {
        Duration {
            seconds: 0,
            permanent: true,
            string: "infinite".to_string(),
        }
    }

    /// Absolute point at which the action expires, or `None` for
    /// permanent actions.
    pub fn expiry(&self) -> Option<time::OffsetDateTime> {
        if self.permanent {
            return None;
        }

        time::OffsetDateTime::now_utc().checked_add(time::Duration::new(self.seconds, 0))
    }

    /// Human form for embeds and log lines.
    pub fn human(&self) -> String {
        if self.permanent {
            return "infinite".to_string();
        }

        pretty_duration(
            &std::time::Duration::from_secs(self.seconds.unsigned_abs()),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_parses_as_permanent() {
        let duration = Duration::parse("infinite").unwrap();
        assert!(duration.permanent);
        assert!(duration.expiry().is_none());
    }

    #[test]
    fn unit_table() {
        assert_eq!(Duration::parse("30m").unwrap().seconds, 30 * 60);
        assert_eq!(Duration::parse("2h").unwrap().seconds, 2 * 60 * 60);
        assert_eq!(Duration::parse("7d").unwrap().seconds, 7 * 24 * 60 * 60);
        assert_eq!(Duration::parse("1y").unwrap().seconds, 365 * 24 * 60 * 60);
    }

    #[test]
    fn malformed_strings_fail_to_parse() {
        assert!(Duration::parse("abc").is_none());
        assert!(Duration::parse("10x").is_none());
        assert!(Duration::parse("10").is_none());
        assert!(Duration::parse("m10").is_none());
        assert!(Duration::parse("").is_none());
    }

    #[test]
    fn finite_duration_has_future_expiry() {
        let duration = Duration::parse("1h").unwrap();
        let expiry = duration.expiry().unwrap();
        assert!(expiry > time::OffsetDateTime::now_utc());
    }
}
