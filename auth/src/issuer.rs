use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::Identity;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::RoleFlags;

/// Issues and verifies signed, time-limited identity assertions.
///
/// Stateless: nothing is stored server-side and there is no revocation list,
/// so expiry is the only way a token stops being accepted.
pub struct TokenIssuer {
    jwt_handler: JwtHandler,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Default token lifetime (7 days).
    pub const DEFAULT_LIFETIME_DAYS: i64 = 7;

    /// Create a new issuer.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `lifetime` - How long an issued token stays valid
    ///
    /// # Errors
    /// * `InvalidLifetime` - Lifetime is zero or negative
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, JwtError> {
        if lifetime <= Duration::zero() {
            return Err(JwtError::InvalidLifetime(format!(
                "{}s",
                lifetime.num_seconds()
            )));
        }

        Ok(Self {
            jwt_handler: JwtHandler::new(secret),
            lifetime,
        })
    }

    /// Create an issuer with the default 7 day lifetime.
    pub fn with_default_lifetime(secret: &[u8]) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            lifetime: Duration::days(Self::DEFAULT_LIFETIME_DAYS),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject` with a snapshot of its role flags.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue(&self, subject: impl ToString, roles: RoleFlags) -> Result<String, JwtError> {
        self.issue_at(subject, roles, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: impl ToString,
        roles: RoleFlags,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, roles, now, self.lifetime);
        self.jwt_handler.encode(&claims)
    }

    /// Verify a token against the system clock.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `InvalidToken` - Bad signature or malformed token
    pub fn verify(&self, token: &str) -> Result<Identity, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// The signature is checked first, so a tampered token is reported as
    /// invalid even when it is also expired.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims.into())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issuer = TokenIssuer::with_default_lifetime(SECRET);

        for roles in [
            RoleFlags::new(false, false),
            RoleFlags::new(true, false),
            RoleFlags::new(false, true),
            RoleFlags::new(true, true),
        ] {
            let token = issuer.issue("user123", roles).expect("Failed to issue");
            let identity = issuer.verify(&token).expect("Failed to verify");

            assert_eq!(identity.subject, "user123");
            assert_eq!(identity.roles, roles);
        }
    }

    #[test]
    fn test_issued_at_is_recorded() {
        let issuer = TokenIssuer::with_default_lifetime(SECRET);
        let now = at(1_700_000_000);

        let token = issuer.issue_at("user123", RoleFlags::default(), now).unwrap();
        let identity = issuer.verify_at(&token, now).unwrap();

        assert_eq!(identity.issued_at, 1_700_000_000);
    }

    #[test]
    fn test_expiry_boundaries() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1)).unwrap();
        let issued = at(1_700_000_000);
        let expiry = at(1_700_000_000 + 3600);

        let token = issuer
            .issue_at("user123", RoleFlags::default(), issued)
            .unwrap();

        assert!(issuer
            .verify_at(&token, expiry - Duration::seconds(1))
            .is_ok());
        assert!(issuer.verify_at(&token, expiry).is_ok());
        assert_eq!(
            issuer.verify_at(&token, expiry + Duration::seconds(1)),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_default_lifetime_is_seven_days() {
        let issuer = TokenIssuer::with_default_lifetime(SECRET);
        let issued = at(0);
        let token = issuer.issue_at("u", RoleFlags::default(), issued).unwrap();

        assert!(issuer.verify_at(&token, at(7 * 24 * 3600)).is_ok());
        assert_eq!(
            issuer.verify_at(&token, at(7 * 24 * 3600 + 1)),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_wrong_secret_is_invalid_not_expired() {
        let issuer = TokenIssuer::with_default_lifetime(SECRET);
        let other = TokenIssuer::with_default_lifetime(b"another_secret_at_least_32_bytes!!");

        // Expired and signed with another key: reported as invalid.
        let token = other.issue_at("u", RoleFlags::default(), at(0)).unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let issuer = TokenIssuer::with_default_lifetime(SECRET);

        assert!(matches!(
            issuer.verify("not-a-token"),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(matches!(issuer.verify(""), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_non_positive_lifetime() {
        assert!(matches!(
            TokenIssuer::new(SECRET, Duration::zero()),
            Err(JwtError::InvalidLifetime(_))
        ));
    }
}
