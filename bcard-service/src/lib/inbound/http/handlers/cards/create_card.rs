use auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::card::errors::CardError;
use crate::domain::card::models::CardText;
use crate::domain::card::models::CreateCardCommand;
use crate::domain::card::ports::CardServicePort;
use crate::domain::common::models::optional_web_url;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Image;
use crate::domain::common::models::Phone;
use crate::inbound::http::handlers::AddressBody;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::CardData;
use crate::inbound::http::handlers::ImageBody;
use crate::inbound::http::router::AppState;

/// HTTP request body for creating a card (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCardRequest {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub web: String,
    #[serde(default)]
    pub image: ImageBody,
    pub address: AddressBody,
}

impl CreateCardRequest {
    fn try_into_command(self) -> Result<CreateCardCommand, CardError> {
        Ok(CreateCardCommand {
            text: CardText::new(&self.title, &self.subtitle, &self.description)?,
            phone: Phone::new(self.phone)?,
            email: EmailAddress::new(self.email)?,
            web: optional_web_url("web", &self.web)?,
            image: Image::new(
                self.image.url,
                self.image.alt,
                (Image::DEFAULT_CARD_URL, Image::DEFAULT_CARD_ALT),
            )?,
            address: self.address.try_into_domain()?,
        })
    }
}

pub async fn create_card(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateCardRequest>,
) -> Result<ApiSuccess<CardData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .card_service
        .create_card(command, &identity)
        .await
        .map_err(ApiError::from)
        .map(|ref card| ApiSuccess::new(StatusCode::CREATED, card.into()))
}
