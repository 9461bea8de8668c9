use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use thiserror::Error;

/// Error for invalid lockout configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockoutPolicyError {
    #[error("Maximum login attempts must be at least 1, got {0}")]
    InvalidThreshold(u32),

    #[error("Lock duration must be at least 1 hour, got {0}")]
    InvalidDuration(u32),
}

/// Failed-login lockout rules.
///
/// Pure decision logic: nothing here reads a clock or touches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_attempts: u32,
    lock_hours: u32,
}

impl LockoutPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_LOCK_HOURS: u32 = 24;

    /// Create a policy.
    ///
    /// # Arguments
    /// * `max_attempts` - Failures that trigger a lock
    /// * `lock_hours` - Length of a lock in whole hours
    ///
    /// # Errors
    /// * `InvalidThreshold` - `max_attempts` is zero
    /// * `InvalidDuration` - `lock_hours` is zero
    pub fn new(max_attempts: u32, lock_hours: u32) -> Result<Self, LockoutPolicyError> {
        if max_attempts == 0 {
            return Err(LockoutPolicyError::InvalidThreshold(max_attempts));
        }
        if lock_hours == 0 {
            return Err(LockoutPolicyError::InvalidDuration(lock_hours));
        }
        Ok(Self {
            max_attempts,
            lock_hours,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn lock_duration(&self) -> Duration {
        Duration::hours(i64::from(self.lock_hours))
    }

    /// Whether a lock expiring at `lock_until` is still in force at `now`.
    ///
    /// The attempt counter is deliberately not consulted: once the window has
    /// passed the account is unlocked, whatever the counter says.
    pub fn is_locked(lock_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        lock_until.map_or(false, |until| until > now)
    }

    /// Whether recording one more failure on top of `failed_attempts` locks
    /// the account.
    pub fn should_lock(&self, failed_attempts: u32) -> bool {
        failed_attempts.saturating_add(1) >= self.max_attempts
    }

    /// Lock expiry for a lock starting at `now`.
    pub fn lock_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lock_duration()
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            lock_hours: Self::DEFAULT_LOCK_HOURS,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.lock_duration(), Duration::hours(24));
    }

    #[test]
    fn test_rejects_zero_values() {
        assert_eq!(
            LockoutPolicy::new(0, 1),
            Err(LockoutPolicyError::InvalidThreshold(0))
        );
        assert_eq!(
            LockoutPolicy::new(3, 0),
            Err(LockoutPolicyError::InvalidDuration(0))
        );
    }

    #[test]
    fn test_should_lock_on_failure_reaching_threshold() {
        let policy = LockoutPolicy::new(3, 1).unwrap();

        assert!(!policy.should_lock(0));
        assert!(!policy.should_lock(1));
        assert!(policy.should_lock(2));
        assert!(policy.should_lock(7));
    }

    #[test]
    fn test_threshold_of_one_locks_on_first_failure() {
        let policy = LockoutPolicy::new(1, 1).unwrap();
        assert!(policy.should_lock(0));
    }

    #[test]
    fn test_should_lock_saturates() {
        let policy = LockoutPolicy::new(3, 1).unwrap();
        assert!(policy.should_lock(u32::MAX));
    }

    #[test]
    fn test_is_locked() {
        let now = at(1_000);

        assert!(!LockoutPolicy::is_locked(None, now));
        assert!(LockoutPolicy::is_locked(Some(at(1_001)), now));
        assert!(!LockoutPolicy::is_locked(Some(at(1_000)), now)); // Exactly at expiry
        assert!(!LockoutPolicy::is_locked(Some(at(999)), now));
    }

    #[test]
    fn test_lock_expiry() {
        let policy = LockoutPolicy::new(3, 2).unwrap();
        assert_eq!(policy.lock_expiry(at(0)), at(2 * 60 * 60));
    }
}
