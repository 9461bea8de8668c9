use auth::Identity;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::parse_card_id;
use crate::card::errors::CardError;
use crate::domain::card::models::BizNumber;
use crate::domain::card::ports::CardServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardData;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct BizNumberRequest {
    pub biz_number: i64,
}

pub async fn set_biz_number(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<BizNumberRequest>,
) -> Result<ApiSuccess<CardData>, ApiError> {
    let card_id = parse_card_id(&id)?;
    let biz_number = BizNumber::new(req.biz_number).map_err(CardError::from)?;

    state
        .card_service
        .set_biz_number(&card_id, biz_number, &identity)
        .await
        .map_err(ApiError::from)
        .map(|ref card| ApiSuccess::new(StatusCode::OK, card.into()))
}
