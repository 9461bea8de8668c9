use auth::Identity;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::parse_card_id;
use crate::domain::card::ports::CardServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardData;
use crate::inbound::http::router::AppState;

/// Delete a card and answer with what was removed.
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<CardData>, ApiError> {
    let card_id = parse_card_id(&id)?;

    state
        .card_service
        .delete_card(&card_id, &identity)
        .await
        .map_err(ApiError::from)
        .map(|ref card| ApiSuccess::new(StatusCode::OK, card.into()))
}
