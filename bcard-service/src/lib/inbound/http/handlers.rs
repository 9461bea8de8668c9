use auth::AuthorizationError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::card::errors::CardError;
use crate::domain::card::models::Card;
use crate::domain::common::errors::FieldError;
use crate::domain::common::models::Address;
use crate::domain::common::models::AddressPatch;
use crate::domain::common::models::Image;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod cards;
pub mod health;
pub mod users;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    Locked(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Locked(msg) => (StatusCode::LOCKED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            _ => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserError::IncorrectCurrentPassword => ApiError::BadRequest(err.to_string()),
            UserError::AccountLocked => ApiError::Locked(err.to_string()),
            UserError::AdminSelfDeletion => ApiError::BadRequest(err.to_string()),
            UserError::InvalidUserId(_) => ApiError::BadRequest(err.to_string()),
            UserError::InvalidEmail(_)
            | UserError::InvalidPhone(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidField(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<CardError> for ApiError {
    fn from(err: CardError) -> Self {
        match err {
            CardError::Forbidden(e) => e.into(),
            CardError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CardError::BizNumberAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            CardError::InvalidCardId(_) | CardError::InvalidUserId(_) => {
                ApiError::BadRequest(err.to_string())
            }
            CardError::InvalidBizNumber(_)
            | CardError::InvalidEmail(_)
            | CardError::InvalidPhone(_)
            | CardError::InvalidField(_) => ApiError::UnprocessableEntity(err.to_string()),
            CardError::BizNumberExhausted
            | CardError::DatabaseError(_)
            | CardError::Unknown(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Body of responses that carry no resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Image as sent by clients; missing parts fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageBody {
    pub url: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressBody {
    #[serde(default)]
    pub state: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: i64,
    #[serde(default)]
    pub zip: String,
}

impl AddressBody {
    pub fn try_into_domain(self) -> Result<Address, FieldError> {
        Address::new(
            &self.state,
            &self.country,
            &self.city,
            &self.street,
            self.house_number,
            &self.zip,
        )
    }
}

/// Address fields of an update request; all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressPatchBody {
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<i64>,
    pub zip: Option<String>,
}

impl From<AddressPatchBody> for AddressPatch {
    fn from(body: AddressPatchBody) -> Self {
        Self {
            state: body.state,
            country: body.country,
            city: body.city,
            street: body.street,
            house_number: body.house_number,
            zip: body.zip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageData {
    pub url: String,
    pub alt: String,
}

impl From<&Image> for ImageData {
    fn from(image: &Image) -> Self {
        Self {
            url: image.url.clone(),
            alt: image.alt.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressData {
    pub state: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: u32,
    pub zip: String,
}

impl From<&Address> for AddressData {
    fn from(address: &Address) -> Self {
        Self {
            state: address.state.clone(),
            country: address.country.clone(),
            city: address.city.clone(),
            street: address.street.clone(),
            house_number: address.house_number,
            zip: address.zip.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameData {
    pub first: String,
    pub middle: String,
    pub last: String,
}

/// Public view of a user; credential state is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub name: NameData,
    pub phone: String,
    pub email: String,
    pub image: ImageData,
    pub address: AddressData,
    pub is_business: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: NameData {
                first: user.name.first.clone(),
                middle: user.name.middle.clone(),
                last: user.name.last.clone(),
            },
            phone: user.phone.as_str().to_string(),
            email: user.email.as_str().to_string(),
            image: (&user.image).into(),
            address: (&user.address).into(),
            is_business: user.is_business,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardData {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub web: String,
    pub image: ImageData,
    pub address: AddressData,
    pub biz_number: u32,
    pub likes: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Card> for CardData {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.to_string(),
            title: card.text.title.clone(),
            subtitle: card.text.subtitle.clone(),
            description: card.text.description.clone(),
            phone: card.phone.as_str().to_string(),
            email: card.email.as_str().to_string(),
            web: card.web.clone(),
            image: (&card.image).into(),
            address: (&card.address).into(),
            biz_number: card.biz_number.value(),
            likes: card.likes.iter().map(ToString::to_string).collect(),
            user_id: card.user_id.to_string(),
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardListData {
    pub cards: Vec<CardData>,
    pub count: usize,
}

impl From<&Vec<Card>> for CardListData {
    fn from(cards: &Vec<Card>) -> Self {
        Self {
            cards: cards.iter().map(CardData::from).collect(),
            count: cards.len(),
        }
    }
}
