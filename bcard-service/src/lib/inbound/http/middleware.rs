use auth::Identity;
use auth::JwtError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that validates bearer tokens and stores the caller's
/// [`Identity`] in request extensions.
///
/// The account behind the token must still exist and must not be locked.
/// Role flags are taken from the token as issued, not from the account.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let identity: Identity = state
        .token_issuer
        .verify_at(token, state.clock.now())
        .map_err(|e| {
            tracing::warn!(error = %e, "Token rejected");
            match e {
                JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
                _ => ApiError::Unauthorized("Invalid token".to_string()),
            }
        })?;

    let user_id = UserId::from_string(&identity.subject)
        .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;
    let user = state.user_service.get_user(&user_id).await.map_err(|e| match e {
        UserError::NotFound(_) => {
            tracing::warn!(user_id = %user_id, "Token subject no longer exists");
            ApiError::Unauthorized("User not found".to_string())
        }
        other => ApiError::from(other),
    })?;

    if user.credentials.is_locked(state.clock.now()) {
        tracing::warn!(user_id = %user_id, "Token used by a locked account");
        return Err(ApiError::from(UserError::AccountLocked));
    }

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized(
                "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
            )
        })
}
