use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::parse_card_id;
use crate::domain::card::ports::CardServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardData;
use crate::inbound::http::router::AppState;

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<CardData>, ApiError> {
    let card_id = parse_card_id(&id)?;

    state
        .card_service
        .get_card(&card_id)
        .await
        .map_err(ApiError::from)
        .map(|ref card| ApiSuccess::new(StatusCode::OK, card.into()))
}
