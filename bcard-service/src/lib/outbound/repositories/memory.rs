use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::card::errors::CardError;
use crate::domain::card::models::BizNumber;
use crate::domain::card::models::Card;
use crate::domain::card::models::CardId;
use crate::domain::card::ports::CardRepository;
use crate::domain::common::models::EmailAddress;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialStore;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local store for users and cards.
///
/// Enforces the same uniqueness rules as the Postgres schema, and deleting a
/// user deletes their cards.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<UserId, User>>,
    cards: RwLock<HashMap<CardId, Card>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let users = self.users.read().await.values().cloned().collect();
        Ok(newest_first(users, |u: &User| u.created_at))
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        let stored = users
            .get_mut(&user.id)
            .ok_or(UserError::NotFound(user.id.to_string()))?;
        let credentials = stored.credentials.clone();
        *stored = User { credentials, ..user };
        Ok(stored.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        if self.users.write().await.remove(id).is_none() {
            return Err(UserError::NotFound(id.to_string()));
        }
        self.cards.write().await.retain(|_, card| card.user_id != *id);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryRepository {
    async fn load_credentials(&self, id: &UserId) -> Result<Option<Credentials>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .get(id)
            .map(|u| u.credentials.clone()))
    }

    async fn save_credentials(
        &self,
        id: &UserId,
        credentials: &Credentials,
    ) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;
        user.credentials = credentials.clone();
        Ok(())
    }
}

#[async_trait]
impl CardRepository for InMemoryRepository {
    async fn create(&self, card: Card) -> Result<Card, CardError> {
        let mut cards = self.cards.write().await;
        if cards.values().any(|c| c.biz_number == card.biz_number) {
            return Err(CardError::BizNumberAlreadyExists(card.biz_number.value()));
        }
        cards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, CardError> {
        Ok(self.cards.read().await.get(id).cloned())
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<Card>, CardError> {
        let needle = search.map(|s| s.to_lowercase());
        let cards = self
            .cards
            .read()
            .await
            .values()
            .filter(|card| match &needle {
                Some(needle) => [&card.text.title, &card.text.subtitle, &card.text.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        Ok(newest_first(cards, |c: &Card| c.created_at))
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Card>, CardError> {
        let cards = self
            .cards
            .read()
            .await
            .values()
            .filter(|card| card.user_id == *owner)
            .cloned()
            .collect();
        Ok(newest_first(cards, |c: &Card| c.created_at))
    }

    async fn find_by_biz_number(&self, biz_number: BizNumber) -> Result<Option<Card>, CardError> {
        Ok(self
            .cards
            .read()
            .await
            .values()
            .find(|card| card.biz_number == biz_number)
            .cloned())
    }

    async fn update(&self, card: Card) -> Result<Card, CardError> {
        let mut cards = self.cards.write().await;
        if cards
            .values()
            .any(|c| c.id != card.id && c.biz_number == card.biz_number)
        {
            return Err(CardError::BizNumberAlreadyExists(card.biz_number.value()));
        }

        let stored = cards.get_mut(&card.id).ok_or(CardError::NotFound(card.id))?;
        *stored = card.clone();
        Ok(card)
    }

    async fn delete(&self, id: &CardId) -> Result<(), CardError> {
        self.cards
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(CardError::NotFound(*id))
    }
}
