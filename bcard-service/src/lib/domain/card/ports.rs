use async_trait::async_trait;
use auth::Identity;

use crate::domain::card::errors::CardError;
use crate::domain::card::models::BizNumber;
use crate::domain::card::models::Card;
use crate::domain::card::models::CardId;
use crate::domain::card::models::CreateCardCommand;
use crate::domain::card::models::LikeToggle;
use crate::domain::card::models::UpdateCardCommand;
use crate::domain::user::models::UserId;

/// Port for card domain service operations.
///
/// Write operations take the caller's identity and enforce role and
/// ownership rules themselves.
#[async_trait]
pub trait CardServicePort: Send + Sync + 'static {
    /// List all cards, newest first, optionally filtered by a
    /// case-insensitive search over title, subtitle and description.
    async fn list_cards(&self, search: Option<&str>) -> Result<Vec<Card>, CardError>;

    /// List cards owned by `owner`, newest first.
    async fn list_user_cards(&self, owner: &UserId) -> Result<Vec<Card>, CardError>;

    /// Retrieve card by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Card does not exist
    async fn get_card(&self, id: &CardId) -> Result<Card, CardError>;

    /// Create a card owned by the caller with a fresh business number.
    ///
    /// # Errors
    /// * `Forbidden` - Caller is neither business nor admin
    /// * `BizNumberExhausted` - No free number found
    /// * `DatabaseError` - Database operation failed
    async fn create_card(
        &self,
        command: CreateCardCommand,
        requested_by: &Identity,
    ) -> Result<Card, CardError>;

    /// Update a card.
    ///
    /// # Errors
    /// * `NotFound` - Card does not exist
    /// * `Forbidden` - Caller is neither the owner nor an admin
    /// * `InvalidField` - Merged content is invalid
    async fn update_card(
        &self,
        id: &CardId,
        command: UpdateCardCommand,
        requested_by: &Identity,
    ) -> Result<Card, CardError>;

    /// Like the card, or remove the caller's like.
    async fn toggle_like(&self, id: &CardId, requested_by: &Identity)
        -> Result<LikeToggle, CardError>;

    /// Delete a card.
    ///
    /// # Errors
    /// * `NotFound` - Card does not exist
    /// * `Forbidden` - Caller is neither the owner nor an admin
    async fn delete_card(&self, id: &CardId, requested_by: &Identity) -> Result<Card, CardError>;

    /// Replace the business number of a card.
    ///
    /// # Errors
    /// * `Forbidden` - Caller is not an admin
    /// * `NotFound` - Card does not exist
    /// * `BizNumberAlreadyExists` - Another card has this number
    async fn set_biz_number(
        &self,
        id: &CardId,
        biz_number: BizNumber,
        requested_by: &Identity,
    ) -> Result<Card, CardError>;
}

/// Persistence operations for card aggregate.
#[async_trait]
pub trait CardRepository: Send + Sync + 'static {
    /// Persist new card.
    ///
    /// # Errors
    /// * `BizNumberAlreadyExists` - Business number is taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, card: Card) -> Result<Card, CardError>;

    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, CardError>;

    /// All cards newest first, filtered when `search` is given.
    async fn list(&self, search: Option<String>) -> Result<Vec<Card>, CardError>;

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Card>, CardError>;

    async fn find_by_biz_number(&self, biz_number: BizNumber) -> Result<Option<Card>, CardError>;

    /// Overwrite an existing card.
    ///
    /// # Errors
    /// * `NotFound` - Card does not exist
    /// * `BizNumberAlreadyExists` - Business number is taken by another card
    async fn update(&self, card: Card) -> Result<Card, CardError>;

    /// # Errors
    /// * `NotFound` - Card does not exist
    async fn delete(&self, id: &CardId) -> Result<(), CardError>;
}
