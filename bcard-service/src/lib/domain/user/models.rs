use std::fmt;

use auth::LockoutPolicy;
use auth::RoleFlags;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::common::errors::FieldError;
use crate::domain::common::models::bounded_text;
use crate::domain::common::models::Address;
use crate::domain::common::models::AddressPatch;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Image;
use crate::domain::common::models::Phone;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered account together with its credential state.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: PersonName,
    pub phone: Phone,
    pub email: EmailAddress,
    pub image: Image,
    pub address: Address,
    pub is_business: bool,
    pub is_admin: bool,
    pub credentials: Credentials,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Role snapshot embedded in issued tokens.
    pub fn roles(&self) -> RoleFlags {
        RoleFlags::new(self.is_business, self.is_admin)
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s.trim())
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First, optional middle, and last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl PersonName {
    pub fn new(first: &str, middle: &str, last: &str) -> Result<Self, FieldError> {
        Ok(Self {
            first: bounded_text("first name", first, 2, 50)?,
            middle: bounded_text("middle name", middle, 0, 50)?,
            last: bounded_text("last name", last, 2, 50)?,
        })
    }

    pub fn patched(
        &self,
        first: Option<&str>,
        middle: Option<&str>,
        last: Option<&str>,
    ) -> Result<Self, FieldError> {
        Self::new(
            first.unwrap_or(&self.first),
            middle.unwrap_or(&self.middle),
            last.unwrap_or(&self.last),
        )
    }
}

/// Stored password hash plus failed-login state.
///
/// The hash never leaves the domain layer; inbound DTOs do not carry it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub password_hash: String,
    pub login_attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(password_hash: String) -> Self {
        Self {
            password_hash,
            login_attempts: 0,
            lock_until: None,
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        LockoutPolicy::is_locked(self.lock_until, now)
    }

    /// Count one failed attempt, locking the account when the threshold is
    /// reached. A lapsed lock is cleared first, so counting restarts at 1.
    ///
    /// Returns whether this failure locked the account.
    pub fn record_failure(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) -> bool {
        if self.lock_until.is_some_and(|until| until <= now) {
            self.login_attempts = 0;
            self.lock_until = None;
        }

        let locks = policy.should_lock(self.login_attempts);
        self.login_attempts = self.login_attempts.saturating_add(1);
        if locks {
            self.lock_until = Some(policy.lock_expiry(now));
        }
        locks
    }

    /// Clear attempts and lock. Returns whether anything changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.login_attempts != 0 || self.lock_until.is_some();
        self.login_attempts = 0;
        self.lock_until = None;
        changed
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password_hash", &"<redacted>")
            .field("login_attempts", &self.login_attempts)
            .field("lock_until", &self.lock_until)
            .finish()
    }
}

/// Plaintext password that satisfies the password policy.
///
/// At least 8 characters with a lowercase letter, an uppercase letter, a
/// digit and one of `!@#$%^&*-_`; nothing else is allowed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const SPECIALS: &'static str = "!@#$%^&*-_";

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        if !password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || Self::SPECIALS.contains(c))
        {
            return Err(PasswordPolicyError::InvalidCharacters);
        }

        let classes: [(&'static str, fn(char) -> bool); 4] = [
            ("lowercase letter", |c| c.is_ascii_lowercase()),
            ("uppercase letter", |c| c.is_ascii_uppercase()),
            ("digit", |c| c.is_ascii_digit()),
            ("special character (!@#$%^&*-_)", |c| Self::SPECIALS.contains(c)),
        ];
        for (name, matches) in classes {
            if !password.chars().any(matches) {
                return Err(PasswordPolicyError::MissingClass(name));
            }
        }

        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub name: PersonName,
    pub phone: Phone,
    pub email: EmailAddress,
    pub password: Password,
    pub image: Image,
    pub address: Address,
    pub is_business: bool,
}

/// Command to update an existing user with optional fields.
///
/// Only provided fields are changed; name and address parts are merged into
/// the stored values and re-validated.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Phone>,
    pub email: Option<EmailAddress>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub address: AddressPatch,
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn policy() -> LockoutPolicy {
        LockoutPolicy::new(3, 1).unwrap()
    }

    #[test]
    fn test_user_id_round_trip() {
        let id = UserId::new();
        assert_eq!(UserId::from_string(&id.to_string()).unwrap(), id);
        assert!(UserId::from_string("nope").is_err());
    }

    #[test]
    fn test_person_name_bounds() {
        assert!(PersonName::new("Al", "", "Lo").is_ok());
        assert!(PersonName::new("A", "", "Lovelace").is_err());
        assert!(PersonName::new("Ada", &"m".repeat(51), "Lovelace").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("Abcdef1!".to_string()).is_ok());
        assert_eq!(
            Password::new("Ab1!".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 4 })
        );
        assert!(matches!(
            Password::new("abcdefg1!".to_string()),
            Err(PasswordPolicyError::MissingClass("uppercase letter"))
        ));
        assert!(matches!(
            Password::new("Abcdefgh1".to_string()),
            Err(PasswordPolicyError::MissingClass(_))
        ));
        assert_eq!(
            Password::new("Abcdef1! ".to_string()),
            Err(PasswordPolicyError::InvalidCharacters)
        );
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("Abcdef1!".to_string()).unwrap();
        assert!(!format!("{password:?}").contains("Abcdef1!"));
    }

    #[test]
    fn test_failures_below_threshold_only_count() {
        let mut credentials = Credentials::new("hash".to_string());

        assert!(!credentials.record_failure(&policy(), now()));
        assert!(!credentials.record_failure(&policy(), now()));

        assert_eq!(credentials.login_attempts, 2);
        assert_eq!(credentials.lock_until, None);
    }

    #[test]
    fn test_failure_reaching_threshold_locks() {
        let mut credentials = Credentials::new("hash".to_string());
        credentials.login_attempts = 2;

        assert!(credentials.record_failure(&policy(), now()));
        assert_eq!(credentials.login_attempts, 3);
        assert_eq!(credentials.lock_until, Some(now() + Duration::hours(1)));
        assert!(credentials.is_locked(now()));
        assert!(!credentials.is_locked(now() + Duration::hours(1)));
    }

    #[test]
    fn test_failure_after_lapsed_lock_restarts_count() {
        let mut credentials = Credentials::new("hash".to_string());
        credentials.login_attempts = 3;
        credentials.lock_until = Some(now());

        assert!(!credentials.record_failure(&policy(), now()));
        assert_eq!(credentials.login_attempts, 1);
        assert_eq!(credentials.lock_until, None);
    }

    #[test]
    fn test_reset_reports_changes() {
        let mut credentials = Credentials::new("hash".to_string());
        assert!(!credentials.reset());

        credentials.login_attempts = 1;
        assert!(credentials.reset());
        assert_eq!(credentials.login_attempts, 0);
    }
}
