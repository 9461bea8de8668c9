use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Phone validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Invalid phone number '{0}': expected 0, a digit 2-9, then 7-8 digits (e.g. 0501234567)")]
    InvalidFormat(String),
}

/// Error for bounded text, numeric and URL fields
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} too short: minimum {min} characters, got {actual}")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field} too long: maximum {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be at least {min}, got {actual}")]
    TooSmall {
        field: &'static str,
        min: i64,
        actual: i64,
    },

    #[error("{field} must be an absolute http(s) URL")]
    InvalidUrl { field: &'static str },
}
