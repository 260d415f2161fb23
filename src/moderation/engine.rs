use std::sync::Arc;

use serenity::all::{GuildId, RoleId, UserId};
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    common::{
        duration::Duration,
        hierarchy,
        logging::{ActionLogger, LogChannelKind, LogEntry},
    },
    models::response::ResponseError,
    moderation::{
        platform::{PlatformActions, PlatformError},
        ActionKind, ReversibleAction,
    },
    storage::store::ConfigStore,
};

/// Top-role positions gathered by the caller before a role-changing
/// action. The engine never talks to the gateway cache itself.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyContext {
    pub actor_top: u16,
    pub bot_top: u16,
    pub target_top: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReversalOutcome {
    Reversed,
    /// The action was not active anymore: the role was already gone, the
    /// ban already lifted. Reported as success-with-notice, never as an
    /// error, whether the reversal was manual or scheduled.
    NotCurrentlyApplied,
}

#[derive(Debug)]
pub struct AppliedAction {
    pub expiry: Option<OffsetDateTime>,
}

/// Applies and reverses moderation actions, and owns the lifecycle of
/// scheduled reversals for temporary ones.
///
/// A scheduled reversal holds only identifiers; when it fires it
/// re-checks what the platform currently says (the role may have been
/// removed by hand in the meantime) and silently no-ops when the action
/// is no longer active. That idempotence, not mutual exclusion, is what
/// makes the manual/scheduled race safe.
pub struct ModerationEngine {
    store: Arc<ConfigStore>,
    platform: Arc<dyn PlatformActions>,
    logger: Arc<dyn ActionLogger>,
    bot_user_id: UserId,
}

impl ModerationEngine {
    pub fn new(
        store: Arc<ConfigStore>,
        platform: Arc<dyn PlatformActions>,
        logger: Arc<dyn ActionLogger>,
        bot_user_id: UserId,
    ) -> Self {
        ModerationEngine {
            store,
            platform,
            logger,
            bot_user_id,
        }
    }

    pub async fn apply_ban(
        &self,
        guild_id: GuildId,
        target: UserId,
        hierarchy: HierarchyContext,
        duration: &Duration,
        reason: &str,
        moderator: UserId,
    ) -> Result<AppliedAction, ResponseError> {
        hierarchy::check(hierarchy.actor_top, hierarchy.bot_top, hierarchy.target_top)?;

        self.platform.ban(guild_id, target, reason).await?;

        self.logger
            .log(LogEntry {
                guild_id,
                action: ActionKind::Ban,
                user_id: target,
                moderator_id: moderator,
                reason: Some(reason.to_string()),
                duration: Some(duration.human()),
                channel: LogChannelKind::General,
            })
            .await;

        let expiry = duration.expiry();
        if let Some(expiry) = expiry {
            self.schedule_reversal(guild_id, target, ReversibleAction::Ban, expiry, duration);
        }

        Ok(AppliedAction { expiry })
    }

    pub async fn apply_mute(
        &self,
        guild_id: GuildId,
        target: UserId,
        hierarchy: HierarchyContext,
        duration: &Duration,
        reason: &str,
        moderator: UserId,
    ) -> Result<AppliedAction, ResponseError> {
        hierarchy::check(hierarchy.actor_top, hierarchy.bot_top, hierarchy.target_top)?;

        let config = self.store.get_guild(guild_id).await?;
        let Some(mute) = config.mute else {
            return Err(ResponseError::Execution(
                "Mute system is not set up!",
                Some("Ask an administrator to run the `setupmute` command first.".to_string()),
            ));
        };

        self.platform
            .add_role(guild_id, target, mute.muted_role_id, reason)
            .await?;

        self.logger
            .log(LogEntry {
                guild_id,
                action: ActionKind::Mute,
                user_id: target,
                moderator_id: moderator,
                reason: Some(reason.to_string()),
                duration: Some(duration.human()),
                channel: LogChannelKind::General,
            })
            .await;

        let expiry = duration.expiry();
        if let Some(expiry) = expiry {
            self.schedule_reversal(guild_id, target, ReversibleAction::Mute, expiry, duration);
        }

        Ok(AppliedAction { expiry })
    }

    /// Jails a member: snapshots their current roles into the guild
    /// config, then strips them down to the jailed role alone. The
    /// snapshot is consumed by the next unjail, so restore is single-use.
    pub async fn apply_jail(
        &self,
        guild_id: GuildId,
        target: UserId,
        hierarchy: HierarchyContext,
        duration: &Duration,
        reason: &str,
        moderator: UserId,
    ) -> Result<AppliedAction, ResponseError> {
        hierarchy::check(hierarchy.actor_top, hierarchy.bot_top, hierarchy.target_top)?;

        let config = self.store.get_guild(guild_id).await?;
        let Some(jail) = config.jail else {
            return Err(ResponseError::Execution(
                "Jail system is not set up!",
                Some("Ask an administrator to run the `setupjail` command first.".to_string()),
            ));
        };

        let held = self.platform.member_roles(guild_id, target).await?;
        let everyone = RoleId::new(guild_id.get());
        let snapshot: Vec<RoleId> = held
            .into_iter()
            .filter(|role| *role != everyone && *role != jail.jailed_role_id)
            .collect();

        self.store
            .update_guild(guild_id, |config| {
                config.user_roles.insert(target.to_string(), snapshot);
            })
            .await?;

        self.platform
            .replace_roles(guild_id, target, &[jail.jailed_role_id], reason)
            .await?;

        self.logger
            .log(LogEntry {
                guild_id,
                action: ActionKind::Jail,
                user_id: target,
                moderator_id: moderator,
                reason: Some(reason.to_string()),
                duration: Some(duration.human()),
                channel: LogChannelKind::Jail,
            })
            .await;

        let expiry = duration.expiry();
        if let Some(expiry) = expiry {
            self.schedule_reversal(guild_id, target, ReversibleAction::Jail, expiry, duration);
        }

        Ok(AppliedAction { expiry })
    }

    pub async fn kick(
        &self,
        guild_id: GuildId,
        target: UserId,
        hierarchy: HierarchyContext,
        reason: &str,
        moderator: UserId,
    ) -> Result<(), ResponseError> {
        hierarchy::check(hierarchy.actor_top, hierarchy.bot_top, hierarchy.target_top)?;

        self.platform.kick(guild_id, target, reason).await?;

        self.logger
            .log(LogEntry {
                guild_id,
                action: ActionKind::Kick,
                user_id: target,
                moderator_id: moderator,
                reason: Some(reason.to_string()),
                duration: None,
                channel: LogChannelKind::General,
            })
            .await;

        Ok(())
    }

    /// Undoes an active action. Checks what the platform currently says
    /// before acting, so calling it twice in a row (or racing the
    /// scheduler) yields `NotCurrentlyApplied` the second time with no
    /// duplicate log entry.
    pub async fn reverse(
        &self,
        guild_id: GuildId,
        target: UserId,
        kind: ReversibleAction,
        moderator: UserId,
        reason: Option<String>,
    ) -> Result<ReversalOutcome, ResponseError> {
        let audit = reason
            .clone()
            .unwrap_or_else(|| format!("{} reversal", kind));

        match kind {
            ReversibleAction::Ban => match self.platform.unban(guild_id, target, &audit).await {
                Ok(()) => {}
                Err(PlatformError::NotFound) => return Ok(ReversalOutcome::NotCurrentlyApplied),
                Err(err) => return Err(err.into()),
            },
            ReversibleAction::Mute => {
                let config = self.store.get_guild(guild_id).await?;
                let Some(mute) = config.mute else {
                    return Err(ResponseError::Execution(
                        "Mute system is not set up!",
                        Some(
                            "Ask an administrator to run the `setupmute` command first."
                                .to_string(),
                        ),
                    ));
                };

                let held = match self.platform.member_roles(guild_id, target).await {
                    Ok(held) => held,
                    Err(PlatformError::NotFound) => {
                        return Ok(ReversalOutcome::NotCurrentlyApplied)
                    }
                    Err(err) => return Err(err.into()),
                };
                if !held.contains(&mute.muted_role_id) {
                    return Ok(ReversalOutcome::NotCurrentlyApplied);
                }

                self.platform
                    .remove_role(guild_id, target, mute.muted_role_id, &audit)
                    .await?;
            }
            ReversibleAction::Jail => {
                let config = self.store.get_guild(guild_id).await?;
                let Some(jail) = config.jail else {
                    return Err(ResponseError::Execution(
                        "Jail system is not set up!",
                        Some(
                            "Ask an administrator to run the `setupjail` command first."
                                .to_string(),
                        ),
                    ));
                };

                let held = match self.platform.member_roles(guild_id, target).await {
                    Ok(held) => held,
                    Err(PlatformError::NotFound) => {
                        return Ok(ReversalOutcome::NotCurrentlyApplied)
                    }
                    Err(err) => return Err(err.into()),
                };
                if !held.contains(&jail.jailed_role_id) {
                    return Ok(ReversalOutcome::NotCurrentlyApplied);
                }

                self.platform
                    .remove_role(guild_id, target, jail.jailed_role_id, &audit)
                    .await?;

                let saved = self
                    .store
                    .update_guild(guild_id, |config| {
                        config.user_roles.remove(&target.to_string())
                    })
                    .await?
                    .unwrap_or_default();
                if !saved.is_empty() {
                    self.platform
                        .add_roles(guild_id, target, &saved, &audit)
                        .await?;
                }
            }
        }

        self.logger
            .log(LogEntry {
                guild_id,
                action: kind.reversal_kind(),
                user_id: target,
                moderator_id: moderator,
                reason,
                duration: None,
                channel: match kind {
                    ReversibleAction::Jail => LogChannelKind::Jail,
                    _ => LogChannelKind::General,
                },
            })
            .await;

        Ok(ReversalOutcome::Reversed)
    }

    /// Registers the pending reversal for a temporary action. Spawning is
    /// the whole registration: no lock is held and the invoking command
    /// replies immediately, while the firing happens on its own timeline.
    /// The task owns its own handle onto the shared collaborators, so it
    /// outlives whatever event registered it.
    fn schedule_reversal(
        &self,
        guild_id: GuildId,
        target: UserId,
        kind: ReversibleAction,
        expiry: OffsetDateTime,
        duration: &Duration,
    ) {
        let engine = ModerationEngine {
            store: self.store.clone(),
            platform: self.platform.clone(),
            logger: self.logger.clone(),
            bot_user_id: self.bot_user_id,
        };
        let label = duration.string.clone();

        tokio::spawn(async move {
            let wait = expiry - OffsetDateTime::now_utc();
            let millis = wait.whole_milliseconds();
            if millis > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(millis as u64)).await;
            }

            let reason = format!("Temporary {kind} expired ({label})");
            match engine
                .reverse(guild_id, target, kind, engine.bot_user_id, Some(reason))
                .await
            {
                Ok(ReversalOutcome::Reversed) => {
                    debug!(
                        "Expired {kind} for user {} in guild {}",
                        target.get(),
                        guild_id.get()
                    );
                }
                Ok(ReversalOutcome::NotCurrentlyApplied) => {}
                Err(err) => {
                    debug!(
                        "Scheduled {kind} reversal for user {} in guild {} failed: {err:?}",
                        target.get(),
                        guild_id.get()
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::logging::mock::RecordingLogger,
        models::config::{JailConfig, MuteConfig},
        moderation::platform::mock::MockPlatform,
    };

    const GUILD: GuildId = GuildId::new(10);
    const TARGET: UserId = UserId::new(200);
    const MODERATOR: UserId = UserId::new(300);
    const BOT: UserId = UserId::new(999);
    const MUTED_ROLE: RoleId = RoleId::new(501);
    const JAILED_ROLE: RoleId = RoleId::new(502);

    fn above() -> HierarchyContext {
        HierarchyContext {
            actor_top: 10,
            bot_top: 20,
            target_top: 5,
        }
    }

    struct Fixture {
        engine: Arc<ModerationEngine>,
        platform: Arc<MockPlatform>,
        logger: Arc<RecordingLogger>,
        store: Arc<ConfigStore>,
        _dir: tempfile::TempDir,
    }

    async fn fixture(platform: MockPlatform) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ConfigStore::new(dir.path()));
        let platform = Arc::new(platform);
        let logger = Arc::new(RecordingLogger::new());
        let engine = Arc::new(ModerationEngine::new(
            store.clone(),
            platform.clone(),
            logger.clone(),
            BOT,
        ));
        Fixture {
            engine,
            platform,
            logger,
            store,
            _dir: dir,
        }
    }

    async fn configure_mute(store: &ConfigStore) {
        store
            .update_guild(GUILD, |config| {
                config.mute = Some(MuteConfig {
                    muted_role_id: MUTED_ROLE,
                });
            })
            .await
            .unwrap();
    }

    async fn configure_jail(store: &ConfigStore) {
        store
            .update_guild(GUILD, |config| {
                config.jail = Some(JailConfig {
                    jailed_role_id: JAILED_ROLE,
                    jail_channel_id: serenity::all::ChannelId::new(700),
                });
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reverse_is_idempotent_for_mute() {
        let fx = fixture(MockPlatform::new().with_member(GUILD, TARGET, vec![])).await;
        configure_mute(&fx.store).await;

        fx.engine
            .apply_mute(
                GUILD,
                TARGET,
                above(),
                &Duration::permanent(),
                "spam",
                MODERATOR,
            )
            .await
            .unwrap();
        assert!(fx.platform.member_role_set(GUILD, TARGET).contains(&MUTED_ROLE));

        let first = fx
            .engine
            .reverse(GUILD, TARGET, ReversibleAction::Mute, MODERATOR, None)
            .await
            .unwrap();
        assert_eq!(first, ReversalOutcome::Reversed);
        assert!(!fx.platform.member_role_set(GUILD, TARGET).contains(&MUTED_ROLE));

        let second = fx
            .engine
            .reverse(GUILD, TARGET, ReversibleAction::Mute, MODERATOR, None)
            .await
            .unwrap();
        assert_eq!(second, ReversalOutcome::NotCurrentlyApplied);

        // One mute, one unmute; the no-op reversal logged nothing.
        assert_eq!(
            fx.logger.kinds(),
            vec![ActionKind::Mute, ActionKind::Unmute]
        );
    }

    #[tokio::test]
    async fn jail_round_trip_restores_snapshot_once() {
        let r1 = RoleId::new(601);
        let r2 = RoleId::new(602);
        let fx = fixture(MockPlatform::new().with_member(GUILD, TARGET, vec![r1, r2])).await;
        configure_jail(&fx.store).await;

        fx.engine
            .apply_jail(
                GUILD,
                TARGET,
                above(),
                &Duration::permanent(),
                "mayhem",
                MODERATOR,
            )
            .await
            .unwrap();

        assert_eq!(fx.platform.member_role_set(GUILD, TARGET), vec![JAILED_ROLE]);
        let config = fx.store.get_guild(GUILD).await.unwrap();
        assert_eq!(
            config.user_roles.get(&TARGET.to_string()),
            Some(&vec![r1, r2])
        );

        let first = fx
            .engine
            .reverse(GUILD, TARGET, ReversibleAction::Jail, MODERATOR, None)
            .await
            .unwrap();
        assert_eq!(first, ReversalOutcome::Reversed);

        let roles = fx.platform.member_role_set(GUILD, TARGET);
        assert!(roles.contains(&r1) && roles.contains(&r2));
        assert!(!roles.contains(&JAILED_ROLE));

        // Snapshot consumed.
        let config = fx.store.get_guild(GUILD).await.unwrap();
        assert!(!config.user_roles.contains_key(&TARGET.to_string()));

        let second = fx
            .engine
            .reverse(GUILD, TARGET, ReversibleAction::Jail, MODERATOR, None)
            .await
            .unwrap();
        assert_eq!(second, ReversalOutcome::NotCurrentlyApplied);
        assert_eq!(fx.logger.kinds(), vec![ActionKind::Jail, ActionKind::Unjail]);
    }

    #[tokio::test(start_paused = true)]
    async fn temporary_ban_expires_on_schedule() {
        let fx = fixture(MockPlatform::new().with_member(GUILD, TARGET, vec![])).await;

        fx.engine
            .apply_ban(
                GUILD,
                TARGET,
                above(),
                &Duration::parse("30m").unwrap(),
                "raid",
                MODERATOR,
            )
            .await
            .unwrap();
        assert!(fx.platform.is_banned(GUILD, TARGET));

        tokio::time::sleep(std::time::Duration::from_secs(31 * 60)).await;
        tokio::task::yield_now().await;

        assert!(!fx.platform.is_banned(GUILD, TARGET));
        assert_eq!(fx.logger.kinds(), vec![ActionKind::Ban, ActionKind::Unban]);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_reversal_wins_race_with_scheduler() {
        let fx = fixture(MockPlatform::new().with_member(GUILD, TARGET, vec![])).await;
        configure_mute(&fx.store).await;

        fx.engine
            .apply_mute(
                GUILD,
                TARGET,
                above(),
                &Duration::parse("10m").unwrap(),
                "spam",
                MODERATOR,
            )
            .await
            .unwrap();

        let manual = fx
            .engine
            .reverse(GUILD, TARGET, ReversibleAction::Mute, MODERATOR, None)
            .await
            .unwrap();
        assert_eq!(manual, ReversalOutcome::Reversed);

        // Let the scheduled reversal fire; it must see the mute gone and
        // stay silent.
        tokio::time::sleep(std::time::Duration::from_secs(11 * 60)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            fx.logger.kinds(),
            vec![ActionKind::Mute, ActionKind::Unmute]
        );
    }

    #[tokio::test]
    async fn kick_has_no_reversal_to_schedule() {
        let fx = fixture(MockPlatform::new().with_member(GUILD, TARGET, vec![])).await;

        fx.engine
            .kick(GUILD, TARGET, above(), "flooding", MODERATOR)
            .await
            .unwrap();

        assert_eq!(
            fx.platform.kicked.lock().unwrap().as_slice(),
            &[(GUILD, TARGET)]
        );
        assert_eq!(fx.logger.kinds(), vec![ActionKind::Kick]);
    }

    #[tokio::test]
    async fn unban_without_ban_reports_not_applied() {
        let fx = fixture(MockPlatform::new()).await;

        let outcome = fx
            .engine
            .reverse(GUILD, TARGET, ReversibleAction::Ban, MODERATOR, None)
            .await
            .unwrap();
        assert_eq!(outcome, ReversalOutcome::NotCurrentlyApplied);
        assert!(fx.logger.kinds().is_empty());
    }

    #[tokio::test]
    async fn bot_below_target_denies_ban() {
        let fx = fixture(MockPlatform::new().with_member(GUILD, TARGET, vec![])).await;

        let denied = fx
            .engine
            .apply_ban(
                GUILD,
                TARGET,
                HierarchyContext {
                    actor_top: 5,
                    bot_top: 3,
                    target_top: 4,
                },
                &Duration::permanent(),
                "nope",
                MODERATOR,
            )
            .await;

        match denied {
            Err(ResponseError::PermissionDenied(reason)) => {
                assert!(reason.contains("My role is too low"));
            }
            other => panic!("expected hierarchy denial, got {other:?}"),
        }
        assert!(!fx.platform.is_banned(GUILD, TARGET));
    }

    #[tokio::test]
    async fn mute_without_configuration_is_reported() {
        let fx = fixture(MockPlatform::new().with_member(GUILD, TARGET, vec![])).await;

        let result = fx
            .engine
            .apply_mute(
                GUILD,
                TARGET,
                above(),
                &Duration::permanent(),
                "spam",
                MODERATOR,
            )
            .await;
        assert!(matches!(
            result,
            Err(ResponseError::Execution("Mute system is not set up!", _))
        ));
    }
}
