use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::SessionData;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Image;
use crate::domain::common::models::Phone;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::AddressBody;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::ImageBody;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameBody {
    pub first: String,
    #[serde(default)]
    pub middle: String,
    pub last: String,
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    pub name: NameBody,
    pub phone: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub image: ImageBody,
    pub address: AddressBody,
    #[serde(default)]
    pub is_business: bool,
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, UserError> {
        Ok(RegisterUserCommand {
            name: PersonName::new(&self.name.first, &self.name.middle, &self.name.last)?,
            phone: Phone::new(self.phone)?,
            email: EmailAddress::new(self.email)?,
            password: Password::new(self.password)?,
            image: Image::new(
                self.image.url,
                self.image.alt,
                (Image::DEFAULT_USER_URL, Image::DEFAULT_USER_ALT),
            )?,
            address: self.address.try_into_domain()?,
            is_business: self.is_business,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(password: &str, phone: &str) -> RegisterUserRequest {
        serde_json::from_value(json!({
            "name": { "first": "Ada", "last": "Lovelace" },
            "phone": phone,
            "email": "Ada@Example.com",
            "password": password,
            "address": {
                "country": "Israel",
                "city": "Haifa",
                "street": "Herzl",
                "house_number": 3
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_request_builds_command() {
        let command = request("Str0ng!pass", "0521234567")
            .try_into_command()
            .unwrap();

        assert_eq!(command.email.as_str(), "ada@example.com");
        assert_eq!(command.image.url, Image::DEFAULT_USER_URL);
        assert_eq!(command.name.middle, "");
        assert!(!command.is_business);
    }

    #[test]
    fn test_weak_password_is_rejected() {
        let result = request("password", "0521234567").try_into_command();
        assert!(matches!(result, Err(UserError::InvalidPassword(_))));
    }

    #[test]
    fn test_bad_phone_is_rejected() {
        let result = request("Str0ng!pass", "12345").try_into_command();
        assert!(matches!(result, Err(UserError::InvalidPhone(_))));
    }
}
