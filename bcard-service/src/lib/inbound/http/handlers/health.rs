use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthData {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

pub async fn health(State(state): State<AppState>) -> ApiSuccess<HealthData> {
    ApiSuccess::new(
        StatusCode::OK,
        HealthData {
            message: "BCard API is running".to_string(),
            timestamp: state.clock.now(),
            environment: state.environment.clone(),
        },
    )
}
