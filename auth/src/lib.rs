//! Authentication utilities library
//!
//! Provides the account-security building blocks used by the BCard service:
//! - Password hashing (Argon2id with configurable cost)
//! - Failed-login lockout policy
//! - JWT identity assertions (issue / verify, expired vs invalid)
//! - Authorization guard (authenticated, admin, business-or-admin, owner-or-admin)
//!
//! Storage-facing parts (attempt counters, per-account serialization) live in
//! the service; everything here is synchronous and storage-agnostic.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(1).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens and Authorization
//! ```
//! use auth::{authorize, Requirement, RoleFlags, TokenIssuer};
//!
//! let issuer = TokenIssuer::with_default_lifetime(b"secret_key_at_least_32_bytes_long!");
//! let token = issuer.issue("user123", RoleFlags::new(true, false)).unwrap();
//!
//! let identity = issuer.verify(&token).unwrap();
//! assert!(authorize(Some(&identity), &Requirement::BusinessOrAdmin).is_ok());
//! assert!(authorize(Some(&identity), &Requirement::AdminOnly).is_err());
//! ```
//!
//! ## Lockout
//! ```
//! use auth::LockoutPolicy;
//!
//! let policy = LockoutPolicy::new(3, 24).unwrap();
//! assert!(!policy.should_lock(1));
//! assert!(policy.should_lock(2));
//! ```

pub mod authorization;
pub mod issuer;
pub mod jwt;
pub mod lockout;
pub mod password;

// Re-export commonly used items
pub use authorization::authorize;
pub use authorization::AuthorizationError;
pub use authorization::Requirement;
pub use issuer::TokenIssuer;
pub use jwt::parse_lifetime;
pub use jwt::Claims;
pub use jwt::Identity;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RoleFlags;
pub use lockout::LockoutPolicy;
pub use lockout::LockoutPolicyError;
pub use password::PasswordError;
pub use password::PasswordHasher;
