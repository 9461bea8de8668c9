use auth::Identity;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::authorize_target;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Phone;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::AddressPatchBody;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::ImageBody;
use crate::inbound::http::handlers::UserData;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

#[derive(Debug, Default, Deserialize)]
pub struct NamePatchBody {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
}

/// HTTP request body for updating a user profile (raw JSON).
///
/// Credentials and role flags cannot be changed here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: NamePatchBody,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub image: ImageBody,
    #[serde(default)]
    pub address: AddressPatchBody,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        Ok(UpdateUserCommand {
            first_name: self.name.first,
            middle_name: self.name.middle,
            last_name: self.name.last,
            phone: self.phone.map(Phone::new).transpose()?,
            email: self.email.map(EmailAddress::new).transpose()?,
            image_url: self.image.url,
            image_alt: self.image.alt,
            address: self.address.into(),
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = authorize_target(&identity, &id)?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
