use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::SessionData;
use crate::domain::common::models::EmailAddress;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Exchange email and password for a token.
///
/// Unknown email and wrong password both answer 401; an active lock answers
/// 423 whatever the password.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    // A malformed email cannot belong to any account.
    let email = EmailAddress::new(req.email).map_err(|_| UserError::InvalidCredentials)?;

    state
        .user_service
        .login(&email, &req.password)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}
