//! Port for throttling repeated failed logins.

use chrono::Duration;

/// Track failed logins per account key and lock the key out once too many
/// failures pile up inside the configured window.
///
/// Keys are normalised e-mail addresses, so unknown accounts are throttled
/// exactly like real ones.
#[cfg_attr(test, mockall::automock)]
pub trait LoginAttemptLimiter: Send + Sync {
    /// Remaining lockout for `key`, or `None` when it may try again.
    fn locked_for(&self, key: &str) -> Option<Duration>;

    /// Count one failed attempt against `key`.
    fn record_failure(&self, key: &str);

    /// Forget the failures of `key` after a successful login.
    fn reset(&self, key: &str);
}
