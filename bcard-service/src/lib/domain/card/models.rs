use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::domain::card::errors::BizNumberError;
use crate::domain::card::errors::CardError;
use crate::domain::card::errors::CardIdError;
use crate::domain::common::errors::FieldError;
use crate::domain::common::models::bounded_text;
use crate::domain::common::models::optional_web_url;
use crate::domain::common::models::Address;
use crate::domain::common::models::AddressPatch;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Image;
use crate::domain::common::models::Phone;
use crate::domain::user::models::UserId;

/// Card unique identifier value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId(pub Uuid);

impl CardId {
    /// Generate a new random card ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a card ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, CardIdError> {
        Uuid::parse_str(s.trim())
            .map(CardId)
            .map_err(|e| CardIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Seven-digit business number, unique across cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BizNumber(u32);

impl BizNumber {
    pub const MIN: u32 = 1_000_000;
    pub const MAX: u32 = 9_999_999;

    pub fn new(value: i64) -> Result<Self, BizNumberError> {
        match u32::try_from(value) {
            Ok(number) if (Self::MIN..=Self::MAX).contains(&number) => Ok(Self(number)),
            _ => Err(BizNumberError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: value,
            }),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BizNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Text content of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardText {
    pub title: String,
    pub subtitle: String,
    pub description: String,
}

impl CardText {
    pub fn new(title: &str, subtitle: &str, description: &str) -> Result<Self, FieldError> {
        Ok(Self {
            title: bounded_text("title", title, 2, 100)?,
            subtitle: bounded_text("subtitle", subtitle, 2, 100)?,
            description: bounded_text("description", description, 2, 1000)?,
        })
    }
}

/// Business card aggregate, owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    pub text: CardText,
    pub phone: Phone,
    pub email: EmailAddress,
    pub web: String,
    pub image: Image,
    pub address: Address,
    pub biz_number: BizNumber,
    pub likes: Vec<UserId>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn is_liked_by(&self, user_id: &UserId) -> bool {
        self.likes.contains(user_id)
    }

    /// Add or remove `user_id` from the likes. Returns whether the card is
    /// now liked by that user.
    pub fn toggle_like(&mut self, user_id: UserId) -> bool {
        if let Some(position) = self.likes.iter().position(|id| *id == user_id) {
            self.likes.remove(position);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }

    pub fn likes_count(&self) -> usize {
        self.likes.len()
    }

    /// Apply a partial update, re-validating every merged part.
    pub fn apply(&mut self, command: UpdateCardCommand) -> Result<(), CardError> {
        let text = CardText::new(
            command.title.as_deref().unwrap_or(&self.text.title),
            command.subtitle.as_deref().unwrap_or(&self.text.subtitle),
            command
                .description
                .as_deref()
                .unwrap_or(&self.text.description),
        )?;
        let address = self.address.patched(command.address)?;
        let web = match command.web {
            Some(web) => optional_web_url("web", &web)?,
            None => self.web.clone(),
        };
        let image = if command.image_url.is_some() || command.image_alt.is_some() {
            Image::new(
                command.image_url.or_else(|| Some(self.image.url.clone())),
                command.image_alt.or_else(|| Some(self.image.alt.clone())),
                (Image::DEFAULT_CARD_URL, Image::DEFAULT_CARD_ALT),
            )?
        } else {
            self.image.clone()
        };

        self.text = text;
        self.address = address;
        self.web = web;
        self.image = image;
        if let Some(phone) = command.phone {
            self.phone = phone;
        }
        if let Some(email) = command.email {
            self.email = email;
        }
        Ok(())
    }
}

/// Command to create a card; the owner comes from the caller's identity.
#[derive(Debug)]
pub struct CreateCardCommand {
    pub text: CardText,
    pub phone: Phone,
    pub email: EmailAddress,
    pub web: String,
    pub image: Image,
    pub address: Address,
}

/// Command to update a card with optional fields.
#[derive(Debug, Default)]
pub struct UpdateCardCommand {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub phone: Option<Phone>,
    pub email: Option<EmailAddress>,
    pub web: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub address: AddressPatch,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone)]
pub struct LikeToggle {
    pub card: Card,
    pub is_liked: bool,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn card(owner: UserId) -> Card {
        Card {
            id: CardId::new(),
            text: CardText::new("Bakery", "Fresh bread", "Sourdough every morning").unwrap(),
            phone: Phone::new("0501234567".to_string()).unwrap(),
            email: EmailAddress::new("bakery@example.com".to_string()).unwrap(),
            web: String::new(),
            image: Image::card_default(),
            address: Address::new("", "Israel", "Tel Aviv", "Dizengoff", 10, "").unwrap(),
            biz_number: BizNumber::new(1_234_567).unwrap(),
            likes: Vec::new(),
            user_id: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
