use thiserror::Error;

/// Error type for JWT operations.
///
/// `TokenExpired` and `InvalidToken` are kept apart so callers can report
/// them differently, even though most collapse both to "unauthenticated".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Invalid token lifetime: {0}")]
    InvalidLifetime(String),
}
