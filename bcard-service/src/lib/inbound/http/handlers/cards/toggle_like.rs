use auth::Identity;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::parse_card_id;
use super::LikeData;
use crate::domain::card::ports::CardServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<LikeData>, ApiError> {
    let card_id = parse_card_id(&id)?;

    state
        .card_service
        .toggle_like(&card_id, &identity)
        .await
        .map_err(ApiError::from)
        .map(|ref toggle| ApiSuccess::new(StatusCode::OK, toggle.into()))
}
