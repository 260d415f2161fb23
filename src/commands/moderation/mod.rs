use crate::common::{args::Args, duration::Duration};

pub mod ban;
pub mod jail;
pub mod kick;
pub mod mute;
pub mod unban;
pub mod unjail;
pub mod unmute;

/// Consumes the optional duration argument. A malformed duration is not
/// fatal: the action proceeds as permanent and the caller shows the
/// returned warning.
pub(crate) fn take_duration(args: &mut Args) -> (Duration, Option<String>) {
    let Some(token) = args.next() else {
        return (Duration::permanent(), None);
    };

    match Duration::parse(&token) {
        Some(duration) => (duration, None),
        None => (
            Duration::permanent(),
            Some(format!(
                "`{token}` is not a valid duration, treating it as `infinite`."
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_duration_is_permanent_without_warning() {
        let mut args = Args::new("");
        let (duration, warning) = take_duration(&mut args);
        assert!(duration.permanent);
        assert!(warning.is_none());
    }

    #[test]
    fn malformed_duration_warns_and_falls_back() {
        let mut args = Args::new("10x spam");
        let (duration, warning) = take_duration(&mut args);
        assert!(duration.permanent);
        assert!(warning.unwrap().contains("10x"));
        // The bad token was still consumed; the reason remains.
        assert_eq!(args.rest().as_deref(), Some("spam"));
    }

    #[test]
    fn valid_duration_is_consumed() {
        let mut args = Args::new("30m spam");
        let (duration, warning) = take_duration(&mut args);
        assert_eq!(duration.seconds, 30 * 60);
        assert!(warning.is_none());
    }
}
