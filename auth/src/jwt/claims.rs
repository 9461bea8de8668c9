use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Role flags carried by an identity.
///
/// The two flags are independent; `is_admin` supersedes business-only checks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleFlags {
    pub is_business: bool,
    pub is_admin: bool,
}

impl RoleFlags {
    pub fn new(is_business: bool, is_admin: bool) -> Self {
        Self {
            is_business,
            is_admin,
        }
    }
}

/// JWT claims for an issued identity assertion.
///
/// Role flags are a snapshot taken at issuance and are not refreshed until a
/// new token is issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    #[serde(flatten)]
    pub roles: RoleFlags,
}

impl Claims {
    /// Create claims for an account, valid for `lifetime` from `issued_at`.
    pub fn for_subject(
        subject: impl ToString,
        roles: RoleFlags,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
            roles,
        }
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}

/// Verified identity extracted from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub roles: RoleFlags,
    pub issued_at: i64,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin
    }

    pub fn is_business(&self) -> bool {
        self.roles.is_business
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            roles: claims.roles,
            issued_at: claims.iat,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_for_subject() {
        let issued_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_subject(
            "user123",
            RoleFlags::new(true, false),
            issued_at,
            Duration::days(7),
        );

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert!(claims.roles.is_business);
        assert!(!claims.roles.is_admin);
    }

    #[test]
    fn test_roles_are_flattened() {
        let claims = Claims {
            sub: "user123".to_string(),
            iat: 1,
            exp: 2,
            roles: RoleFlags::new(false, true),
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["is_admin"], true);
        assert_eq!(json["is_business"], false);
        assert!(json.get("roles").is_none());
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims {
            sub: "user123".to_string(),
            iat: 0,
            exp: 1000,
            roles: RoleFlags::default(),
        };

        assert!(!claims.is_expired(999)); // Not expired
        assert!(!claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001)); // Expired
    }

    #[test]
    fn test_identity_from_claims() {
        let identity = Identity::from(Claims {
            sub: "abc".to_string(),
            iat: 10,
            exp: 20,
            roles: RoleFlags::new(true, true),
        });

        assert_eq!(identity.subject, "abc");
        assert_eq!(identity.issued_at, 10);
        assert!(identity.is_admin());
        assert!(identity.is_business());
    }
}
