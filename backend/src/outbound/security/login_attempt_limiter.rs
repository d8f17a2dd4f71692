//! In-process sliding-window limiter implementing the `LoginAttemptLimiter`
//! port.
//!
//! Each key keeps the timestamps of its recent failures. A key is locked once
//! `max_failures` of them fall inside `window`, and unlocks when the oldest of
//! those ages out. Time comes from the injected clock.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tracing::warn;

use crate::domain::ports::LoginAttemptLimiter;

/// Failures allowed inside one window before the key is locked.
pub const DEFAULT_MAX_FAILURES: u32 = 5;
/// Default sliding window, in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// Rejected throttling configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginThrottleConfigError {
    /// At least one failure must be allowed.
    #[error("login throttling must allow at least one failed attempt")]
    NoFailuresAllowed,
    /// The window is zero or negative.
    #[error("login throttling window must be positive")]
    NonPositiveWindow,
}

/// How many failures a key may accumulate, and over how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginThrottlePolicy {
    max_failures: u32,
    window: Duration,
}

impl LoginThrottlePolicy {
    /// Validate a policy.
    ///
    /// # Errors
    ///
    /// Returns [`LoginThrottleConfigError`] when `max_failures` is zero or
    /// `window` is not positive.
    pub fn new(max_failures: u32, window: Duration) -> Result<Self, LoginThrottleConfigError> {
        if max_failures == 0 {
            return Err(LoginThrottleConfigError::NoFailuresAllowed);
        }
        if window <= Duration::zero() {
            return Err(LoginThrottleConfigError::NonPositiveWindow);
        }
        Ok(Self {
            max_failures,
            window,
        })
    }

    /// Failures allowed before lockout.
    pub const fn max_failures(&self) -> u32 {
        self.max_failures
    }

    /// Sliding window length.
    pub const fn window(&self) -> Duration {
        self.window
    }
}

impl Default for LoginThrottlePolicy {
    fn default() -> Self {
        Self {
            max_failures: DEFAULT_MAX_FAILURES,
            window: Duration::minutes(DEFAULT_WINDOW_MINUTES),
        }
    }
}

/// Failure counters held in process memory.
///
/// Counters are per server process; several replicas each apply the policy
/// on their own.
pub struct InMemoryLoginAttemptLimiter {
    policy: LoginThrottlePolicy,
    clock: Arc<dyn Clock>,
    failures: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl InMemoryLoginAttemptLimiter {
    /// Create a limiter applying `policy` with time read from `clock`.
    pub fn new(policy: LoginThrottlePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            failures: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<DateTime<Utc>>>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune(history: &mut VecDeque<DateTime<Utc>>, horizon: DateTime<Utc>) {
        while history.front().is_some_and(|failed_at| *failed_at <= horizon) {
            history.pop_front();
        }
    }
}

impl LoginAttemptLimiter for InMemoryLoginAttemptLimiter {
    fn locked_for(&self, key: &str) -> Option<Duration> {
        let now = self.clock.utc();
        let horizon = now - self.policy.window;
        let mut failures = self.lock();
        let history = failures.get_mut(key)?;
        Self::prune(history, horizon);
        if history.len() < self.policy.max_failures as usize {
            if history.is_empty() {
                failures.remove(key);
            }
            return None;
        }
        history
            .front()
            .map(|oldest| *oldest + self.policy.window - now)
    }

    fn record_failure(&self, key: &str) {
        let now = self.clock.utc();
        let horizon = now - self.policy.window;
        let mut failures = self.lock();
        failures.retain(|_, history| history.back().is_some_and(|last| *last > horizon));
        let history = failures.entry(key.to_owned()).or_default();
        Self::prune(history, horizon);
        history.push_back(now);
        if history.len() == self.policy.max_failures as usize {
            warn!(
                failures = history.len(),
                window_minutes = self.policy.window.num_minutes(),
                "login key locked after repeated failures"
            );
        }
    }

    fn reset(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    //! Lockout and release against a controllable clock.
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;

    struct AdjustableClock(Mutex<DateTime<Utc>>);

    impl AdjustableClock {
        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for AdjustableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock lock")
        }
    }

    #[fixture]
    fn clock() -> Arc<AdjustableClock> {
        let start = Utc
            .with_ymd_and_hms(2026, 2, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Arc::new(AdjustableClock(Mutex::new(start)))
    }

    fn limiter(clock: &Arc<AdjustableClock>) -> InMemoryLoginAttemptLimiter {
        let policy = LoginThrottlePolicy::new(3, Duration::minutes(10)).expect("valid policy");
        InMemoryLoginAttemptLimiter::new(policy, clock.clone())
    }

    #[rstest]
    fn key_locks_after_the_allowed_failures(clock: Arc<AdjustableClock>) {
        let limiter = limiter(&clock);

        for _ in 0..2 {
            limiter.record_failure("ada@example.org");
            assert_eq!(limiter.locked_for("ada@example.org"), None);
        }
        limiter.record_failure("ada@example.org");

        assert_eq!(
            limiter.locked_for("ada@example.org"),
            Some(Duration::minutes(10))
        );
        assert_eq!(limiter.locked_for("grace@example.org"), None);
    }

    #[rstest]
    fn lockout_ends_when_the_oldest_failure_ages_out(clock: Arc<AdjustableClock>) {
        let limiter = limiter(&clock);
        limiter.record_failure("ada@example.org");
        clock.advance(Duration::minutes(4));
        limiter.record_failure("ada@example.org");
        limiter.record_failure("ada@example.org");

        assert_eq!(
            limiter.locked_for("ada@example.org"),
            Some(Duration::minutes(6))
        );

        clock.advance(Duration::minutes(6));
        assert_eq!(limiter.locked_for("ada@example.org"), None);
    }

    #[rstest]
    fn success_clears_the_counter(clock: Arc<AdjustableClock>) {
        let limiter = limiter(&clock);
        for _ in 0..3 {
            limiter.record_failure("ada@example.org");
        }

        limiter.reset("ada@example.org");

        assert_eq!(limiter.locked_for("ada@example.org"), None);
    }

    #[rstest]
    #[case(0, Duration::minutes(1), LoginThrottleConfigError::NoFailuresAllowed)]
    #[case(3, Duration::zero(), LoginThrottleConfigError::NonPositiveWindow)]
    fn invalid_policies_are_rejected(
        #[case] max_failures: u32,
        #[case] window: Duration,
        #[case] expected: LoginThrottleConfigError,
    ) {
        assert_eq!(LoginThrottlePolicy::new(max_failures, window), Err(expected));
    }
}
