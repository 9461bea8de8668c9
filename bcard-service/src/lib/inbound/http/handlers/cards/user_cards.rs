use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use crate::card::errors::CardError;
use crate::domain::card::ports::CardServicePort;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardListData;
use crate::inbound::http::router::AppState;

pub async fn user_cards(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<CardListData>, ApiError> {
    let owner = UserId::from_string(&user_id).map_err(CardError::from)?;

    state
        .card_service
        .list_user_cards(&owner)
        .await
        .map_err(ApiError::from)
        .map(|ref cards| ApiSuccess::new(StatusCode::OK, cards.into()))
}
