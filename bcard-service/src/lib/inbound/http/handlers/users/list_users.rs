use auth::authorize;
use auth::Identity;
use auth::Requirement;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::UserListData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiSuccess<UserListData>, ApiError> {
    authorize(Some(&identity), &Requirement::AdminOnly)?;

    state
        .user_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|ref users| ApiSuccess::new(StatusCode::OK, users.into()))
}
