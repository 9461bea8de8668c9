use auth::AuthorizationError;
use thiserror::Error;

use crate::domain::card::models::CardId;
use crate::domain::common::errors::EmailError;
use crate::domain::common::errors::FieldError;
use crate::domain::common::errors::PhoneError;
use crate::domain::user::errors::UserIdError;

/// Error type for CardId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CardIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error type for business number validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BizNumberError {
    #[error("Business number must be between {min} and {max}, got {actual}")]
    OutOfRange { min: u32, max: u32, actual: i64 },
}

/// Top-level error type for all card-related operations
#[derive(Debug, Error)]
pub enum CardError {
    #[error("Invalid card ID: {0}")]
    InvalidCardId(#[from] CardIdError),

    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid business number: {0}")]
    InvalidBizNumber(#[from] BizNumberError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("Invalid field: {0}")]
    InvalidField(#[from] FieldError),

    #[error(transparent)]
    Forbidden(#[from] AuthorizationError),

    #[error("Card not found: {0}")]
    NotFound(CardId),

    #[error("Business number already in use: {0}")]
    BizNumberAlreadyExists(u32),

    #[error("Could not allocate a free business number")]
    BizNumberExhausted,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for CardError {
    fn from(err: anyhow::Error) -> Self {
        CardError::Unknown(err.to_string())
    }
}
