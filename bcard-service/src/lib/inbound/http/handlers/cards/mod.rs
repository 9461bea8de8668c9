use auth::Identity;
use serde::Serialize;

use super::ApiError;
use super::CardData;
use crate::card::errors::CardError;
use crate::domain::card::models::CardId;
use crate::domain::card::models::LikeToggle;
use crate::domain::user::models::UserId;

pub mod create_card;
pub mod delete_card;
pub mod get_card;
pub mod list_cards;
pub mod my_cards;
pub mod set_biz_number;
pub mod toggle_like;
pub mod update_card;
pub mod user_cards;

pub use create_card::create_card;
pub use delete_card::delete_card;
pub use get_card::get_card;
pub use list_cards::list_cards;
pub use my_cards::my_cards;
pub use set_biz_number::set_biz_number;
pub use toggle_like::toggle_like;
pub use update_card::update_card;
pub use user_cards::user_cards;

fn parse_card_id(id: &str) -> Result<CardId, ApiError> {
    CardId::from_string(id)
        .map_err(CardError::from)
        .map_err(ApiError::from)
}

fn caller_id(identity: &Identity) -> Result<UserId, ApiError> {
    UserId::from_string(&identity.subject)
        .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeData {
    pub card: CardData,
    pub is_liked: bool,
    pub likes_count: usize,
}

impl From<&LikeToggle> for LikeData {
    fn from(toggle: &LikeToggle) -> Self {
        Self {
            card: (&toggle.card).into(),
            is_liked: toggle.is_liked,
            likes_count: toggle.card.likes_count(),
        }
    }
}
