use auth::Identity;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::parse_card_id;
use crate::card::errors::CardError;
use crate::domain::card::models::UpdateCardCommand;
use crate::domain::card::ports::CardServicePort;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Phone;
use crate::inbound::http::handlers::AddressPatchBody;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardData;
use crate::inbound::http::handlers::ImageBody;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating a card; ownership, likes and the
/// business number are not writable here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    #[serde(default)]
    pub image: ImageBody,
    #[serde(default)]
    pub address: AddressPatchBody,
}

impl UpdateCardRequest {
    fn try_into_command(self) -> Result<UpdateCardCommand, CardError> {
        Ok(UpdateCardCommand {
            title: self.title,
            subtitle: self.subtitle,
            description: self.description,
            phone: self.phone.map(Phone::new).transpose()?,
            email: self.email.map(EmailAddress::new).transpose()?,
            web: self.web,
            image_url: self.image.url,
            image_alt: self.image.alt,
            address: self.address.into(),
        })
    }
}

pub async fn update_card(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCardRequest>,
) -> Result<ApiSuccess<CardData>, ApiError> {
    let card_id = parse_card_id(&id)?;
    let command = req.try_into_command()?;

    state
        .card_service
        .update_card(&card_id, command, &identity)
        .await
        .map_err(ApiError::from)
        .map(|ref card| ApiSuccess::new(StatusCode::OK, card.into()))
}
