use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::domain::card::ports::CardServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardListData;
use crate::inbound::http::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListCardsQuery {
    pub search: Option<String>,
}

pub async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<ListCardsQuery>,
) -> Result<ApiSuccess<CardListData>, ApiError> {
    state
        .card_service
        .list_cards(query.search.as_deref())
        .await
        .map_err(ApiError::from)
        .map(|ref cards| ApiSuccess::new(StatusCode::OK, cards.into()))
}
