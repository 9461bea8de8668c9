use auth::Identity;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::authorize_target;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::UserData;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct BusinessStatusRequest {
    pub is_business: bool,
}

pub async fn set_business_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<BusinessStatusRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = authorize_target(&identity, &id)?;

    state
        .user_service
        .set_business_status(&user_id, req.is_business)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
