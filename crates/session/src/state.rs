use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of one client-side session instance.
///
/// `Expired` is terminal: a new session (re-authentication) is required to
/// return to `Active`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Warning,
    Expired,
}

/// Kind of "user is present" signal the host UI can deliver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Pointer,
    Keyboard,
    Touch,
    Network,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IdleConfigError {
    #[error("expire_after must be greater than warn_after")]
    ExpireNotAfterWarn,

    #[error("tick interval must be non-zero")]
    ZeroTick,

    #[error("activity signals must include at least pointer and keyboard")]
    MissingCoreSignals,
}

/// Idle-timeout configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleConfig {
    /// Idle time before the warning indicator is shown.
    pub warn_after: Duration,
    /// Idle time before forced logout. Must exceed `warn_after`.
    pub expire_after: Duration,
    /// Period of the idle-evaluation poll.
    pub tick: Duration,
    /// Signals that count as "user is present". Pointer and keyboard are
    /// mandatory.
    pub signals: BTreeSet<ActivityKind>,
    /// Login entry point the monitor redirects to on expiry. Distinct from
    /// the plain "not logged in" path so the UI can say "expired, please
    /// log in again".
    pub login_path: String,
}

impl IdleConfig {
    pub const DEFAULT_WARN_AFTER: Duration = Duration::from_secs(10 * 60);
    pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(15 * 60);
    pub const DEFAULT_TICK: Duration = Duration::from_secs(1);
    pub const DEFAULT_LOGIN_PATH: &'static str = "/login?reason=expired";

    pub fn new(warn_after: Duration, expire_after: Duration) -> Result<Self, IdleConfigError> {
        Self {
            warn_after,
            expire_after,
            tick: Self::DEFAULT_TICK,
            signals: BTreeSet::from([
                ActivityKind::Pointer,
                ActivityKind::Keyboard,
                ActivityKind::Touch,
            ]),
            login_path: Self::DEFAULT_LOGIN_PATH.to_string(),
        }
        .validated()
    }

    /// Defaults, with `LEDGERDESK_IDLE_WARN_SECS` / `LEDGERDESK_IDLE_EXPIRE_SECS`
    /// overrides. Unparseable values fall back to the defaults.
    pub fn from_env() -> Result<Self, IdleConfigError> {
        let warn = env_secs("LEDGERDESK_IDLE_WARN_SECS").unwrap_or(Self::DEFAULT_WARN_AFTER);
        let expire = env_secs("LEDGERDESK_IDLE_EXPIRE_SECS").unwrap_or(Self::DEFAULT_EXPIRE_AFTER);
        Self::new(warn, expire)
    }

    pub fn validated(self) -> Result<Self, IdleConfigError> {
        if self.expire_after <= self.warn_after {
            return Err(IdleConfigError::ExpireNotAfterWarn);
        }
        if self.tick.is_zero() {
            return Err(IdleConfigError::ZeroTick);
        }
        if !self.signals.contains(&ActivityKind::Pointer)
            || !self.signals.contains(&ActivityKind::Keyboard)
        {
            return Err(IdleConfigError::MissingCoreSignals);
        }
        Ok(self)
    }
}

fn env_secs(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Point-in-time view of the machine: current state plus the timestamp the
/// idle countdown runs from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub last_activity_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Fresh session at login time.
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::Active,
            last_activity_at: now,
        }
    }
}

/// Input to one transition step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A qualifying user-presence event.
    Activity,
    /// Periodic idle-time evaluation.
    Tick,
}

/// Observable state change produced by a step; the driver performs the
/// matching side effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// active → warning: show the warning indicator.
    Warned,
    /// warning → active: dismiss the warning indicator.
    Resumed,
    /// → expired: invalidate the session, then redirect to login.
    Expired,
}

/// Pure transition function `(snapshot, signal, now) -> (snapshot, transition)`.
///
/// `Expired` is absorbing: every signal leaves it unchanged. A tick that
/// finds the idle time already past `expire_after` expires the session even
/// from `Active` (a long suspend must not grant a warning grace period).
/// A clock that moved backwards reads as zero idle time.
pub fn step(
    snapshot: &SessionSnapshot,
    signal: SessionSignal,
    now: DateTime<Utc>,
    config: &IdleConfig,
) -> (SessionSnapshot, Option<Transition>) {
    if snapshot.state == SessionState::Expired {
        return (*snapshot, None);
    }

    match signal {
        SessionSignal::Activity => {
            let resumed = snapshot.state == SessionState::Warning;
            (
                SessionSnapshot {
                    state: SessionState::Active,
                    last_activity_at: now,
                },
                resumed.then_some(Transition::Resumed),
            )
        }
        SessionSignal::Tick => {
            let idle = idle_time(snapshot, now);
            if idle >= config.expire_after {
                (
                    SessionSnapshot {
                        state: SessionState::Expired,
                        ..*snapshot
                    },
                    Some(Transition::Expired),
                )
            } else if idle >= config.warn_after && snapshot.state == SessionState::Active {
                (
                    SessionSnapshot {
                        state: SessionState::Warning,
                        ..*snapshot
                    },
                    Some(Transition::Warned),
                )
            } else {
                (*snapshot, None)
            }
        }
    }
}

/// Time left until forced expiry; zero once expired.
pub fn remaining_until_expiry(
    snapshot: &SessionSnapshot,
    now: DateTime<Utc>,
    config: &IdleConfig,
) -> Duration {
    if snapshot.state == SessionState::Expired {
        return Duration::ZERO;
    }
    config
        .expire_after
        .saturating_sub(idle_time(snapshot, now))
}

fn idle_time(snapshot: &SessionSnapshot, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(snapshot.last_activity_at)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn cfg() -> IdleConfig {
        IdleConfig::new(Duration::from_secs(5), Duration::from_secs(15)).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::seconds(seconds)
    }

    #[test]
    fn stays_active_before_the_warning_threshold() {
        let snap = SessionSnapshot::started(t0());
        for s in [0, 1, 4] {
            let (next, transition) = step(&snap, SessionSignal::Tick, at(s), &cfg());
            assert_eq!(next.state, SessionState::Active);
            assert_eq!(transition, None);
        }
    }

    #[test]
    fn warns_then_expires_at_the_thresholds() {
        let mut snap = SessionSnapshot::started(t0());

        let (next, transition) = step(&snap, SessionSignal::Tick, at(5), &cfg());
        assert_eq!(next.state, SessionState::Warning);
        assert_eq!(transition, Some(Transition::Warned));
        snap = next;

        let (next, transition) = step(&snap, SessionSignal::Tick, at(14), &cfg());
        assert_eq!(next.state, SessionState::Warning);
        assert_eq!(transition, None);
        snap = next;

        let (next, transition) = step(&snap, SessionSignal::Tick, at(15), &cfg());
        assert_eq!(next.state, SessionState::Expired);
        assert_eq!(transition, Some(Transition::Expired));
    }

    #[test]
    fn activity_during_warning_restarts_the_countdown_from_the_signal() {
        let snap = SessionSnapshot::started(t0());
        let (warned, _) = step(&snap, SessionSignal::Tick, at(6), &cfg());

        let (resumed, transition) = step(&warned, SessionSignal::Activity, at(7), &cfg());
        assert_eq!(transition, Some(Transition::Resumed));
        assert_eq!(resumed.state, SessionState::Active);
        assert_eq!(resumed.last_activity_at, at(7));

        // Countdown runs from t0+7, not t0: no warning at t0+11, warning at t0+12.
        let (next, transition) = step(&resumed, SessionSignal::Tick, at(11), &cfg());
        assert_eq!(next.state, SessionState::Active);
        assert_eq!(transition, None);
        let (next, _) = step(&resumed, SessionSignal::Tick, at(12), &cfg());
        assert_eq!(next.state, SessionState::Warning);
    }

    #[test]
    fn activity_while_active_resets_silently() {
        let snap = SessionSnapshot::started(t0());
        let (next, transition) = step(&snap, SessionSignal::Activity, at(3), &cfg());
        assert_eq!(next.state, SessionState::Active);
        assert_eq!(next.last_activity_at, at(3));
        assert_eq!(transition, None);
    }

    #[test]
    fn expired_is_terminal() {
        let snap = SessionSnapshot {
            state: SessionState::Expired,
            last_activity_at: t0(),
        };
        for signal in [SessionSignal::Activity, SessionSignal::Tick] {
            let (next, transition) = step(&snap, signal, at(100), &cfg());
            assert_eq!(next, snap);
            assert_eq!(transition, None);
        }
    }

    #[test]
    fn long_suspend_skips_straight_to_expired() {
        let snap = SessionSnapshot::started(t0());
        let (next, transition) = step(&snap, SessionSignal::Tick, at(120), &cfg());
        assert_eq!(next.state, SessionState::Expired);
        assert_eq!(transition, Some(Transition::Expired));
    }

    #[test]
    fn backwards_clock_reads_as_zero_idle() {
        let snap = SessionSnapshot::started(t0());
        let (next, transition) = step(&snap, SessionSignal::Tick, at(-30), &cfg());
        assert_eq!(next.state, SessionState::Active);
        assert_eq!(transition, None);
        assert_eq!(
            remaining_until_expiry(&snap, at(-30), &cfg()),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn remaining_time_counts_down_to_zero() {
        let snap = SessionSnapshot::started(t0());
        assert_eq!(
            remaining_until_expiry(&snap, at(4), &cfg()),
            Duration::from_secs(11)
        );
        assert_eq!(remaining_until_expiry(&snap, at(40), &cfg()), Duration::ZERO);
    }

    #[test]
    fn env_overrides_feed_the_config() {
        unsafe {
            std::env::set_var("LEDGERDESK_IDLE_WARN_SECS", "120");
            std::env::set_var("LEDGERDESK_IDLE_EXPIRE_SECS", "300");
        }
        let config = IdleConfig::from_env().unwrap();
        assert_eq!(config.warn_after, Duration::from_secs(120));
        assert_eq!(config.expire_after, Duration::from_secs(300));
        unsafe {
            std::env::remove_var("LEDGERDESK_IDLE_WARN_SECS");
            std::env::remove_var("LEDGERDESK_IDLE_EXPIRE_SECS");
        }
    }

    #[test]
    fn config_rejects_inverted_and_degenerate_values() {
        assert_eq!(
            IdleConfig::new(Duration::from_secs(15), Duration::from_secs(15)).unwrap_err(),
            IdleConfigError::ExpireNotAfterWarn
        );

        let mut config = cfg();
        config.tick = Duration::ZERO;
        assert_eq!(config.validated().unwrap_err(), IdleConfigError::ZeroTick);

        let mut config = cfg();
        config.signals.remove(&ActivityKind::Keyboard);
        assert_eq!(
            config.validated().unwrap_err(),
            IdleConfigError::MissingCoreSignals
        );
    }
}
