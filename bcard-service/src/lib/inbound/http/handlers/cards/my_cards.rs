use auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::caller_id;
use crate::domain::card::ports::CardServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardListData;
use crate::inbound::http::router::AppState;

pub async fn my_cards(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiSuccess<CardListData>, ApiError> {
    let owner = caller_id(&identity)?;

    state
        .card_service
        .list_user_cards(&owner)
        .await
        .map_err(ApiError::from)
        .map(|ref cards| ApiSuccess::new(StatusCode::OK, cards.into()))
}
