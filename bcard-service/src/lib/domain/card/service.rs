use std::sync::Arc;

use async_trait::async_trait;
use auth::authorize;
use auth::Identity;
use auth::Requirement;

use super::errors::CardError;
use super::models::BizNumber;
use super::models::Card;
use super::models::CardId;
use super::models::CreateCardCommand;
use super::models::LikeToggle;
use super::models::UpdateCardCommand;
use super::ports::CardRepository;
use super::ports::CardServicePort;
use crate::domain::clock::Clock;
use crate::domain::user::models::UserId;

/// Concrete implementation of CardServicePort.
///
/// Generic over repository for testability.
pub struct CardService<CR>
where
    CR: CardRepository,
{
    card_repository: Arc<CR>,
    clock: Arc<dyn Clock>,
}

impl<CR> CardService<CR>
where
    CR: CardRepository,
{
    /// Random draws before giving up on finding a free business number.
    const BIZ_NUMBER_ATTEMPTS: usize = 20;

    pub fn new(card_repository: Arc<CR>, clock: Arc<dyn Clock>) -> Self {
        Self {
            card_repository,
            clock,
        }
    }

    async fn find(&self, id: &CardId) -> Result<Card, CardError> {
        self.card_repository
            .find_by_id(id)
            .await?
            .ok_or(CardError::NotFound(*id))
    }

    async fn find_owned(&self, id: &CardId, requested_by: &Identity) -> Result<Card, CardError> {
        let card = self.find(id).await?;
        authorize(
            Some(requested_by),
            &Requirement::OwnerOrAdmin(card.user_id.to_string()),
        )?;
        Ok(card)
    }

    async fn free_biz_number(&self) -> Result<Option<BizNumber>, CardError> {
        let candidate = BizNumber::random(&mut rand::thread_rng());
        let taken = self
            .card_repository
            .find_by_biz_number(candidate)
            .await?
            .is_some();
        Ok((!taken).then_some(candidate))
    }
}

#[async_trait]
impl<CR> CardServicePort for CardService<CR>
where
    CR: CardRepository + 'static,
{
    async fn list_cards(&self, search: Option<&str>) -> Result<Vec<Card>, CardError> {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.card_repository.list(search).await
    }

    async fn list_user_cards(&self, owner: &UserId) -> Result<Vec<Card>, CardError> {
        self.card_repository.find_by_owner(owner).await
    }

    async fn get_card(&self, id: &CardId) -> Result<Card, CardError> {
        self.find(id).await
    }

    async fn create_card(
        &self,
        command: CreateCardCommand,
        requested_by: &Identity,
    ) -> Result<Card, CardError> {
        authorize(Some(requested_by), &Requirement::BusinessOrAdmin)?;
        let owner = UserId::from_string(&requested_by.subject)?;

        let now = self.clock.now();
        let mut card = Card {
            id: CardId::new(),
            text: command.text,
            phone: command.phone,
            email: command.email,
            web: command.web,
            image: command.image,
            address: command.address,
            biz_number: BizNumber::random(&mut rand::thread_rng()),
            likes: Vec::new(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };

        for _ in 0..Self::BIZ_NUMBER_ATTEMPTS {
            let Some(biz_number) = self.free_biz_number().await? else {
                continue;
            };
            card.biz_number = biz_number;

            match self.card_repository.create(card.clone()).await {
                // Lost a race for the number; draw again.
                Err(CardError::BizNumberAlreadyExists(_)) => continue,
                Ok(created) => {
                    tracing::info!(card_id = %created.id, biz_number = %created.biz_number, "Card created");
                    return Ok(created);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!("No free business number after {} draws", Self::BIZ_NUMBER_ATTEMPTS);
        Err(CardError::BizNumberExhausted)
    }

    async fn update_card(
        &self,
        id: &CardId,
        command: UpdateCardCommand,
        requested_by: &Identity,
    ) -> Result<Card, CardError> {
        let mut card = self.find_owned(id, requested_by).await?;
        card.apply(command)?;
        card.updated_at = self.clock.now();
        self.card_repository.update(card).await
    }

    async fn toggle_like(
        &self,
        id: &CardId,
        requested_by: &Identity,
    ) -> Result<LikeToggle, CardError> {
        authorize(Some(requested_by), &Requirement::AnyAuthenticated)?;
        let user_id = UserId::from_string(&requested_by.subject)?;

        let mut card = self.find(id).await?;
        let is_liked = card.toggle_like(user_id);
        let card = self.card_repository.update(card).await?;

        Ok(LikeToggle { card, is_liked })
    }

    async fn delete_card(&self, id: &CardId, requested_by: &Identity) -> Result<Card, CardError> {
        let card = self.find_owned(id, requested_by).await?;
        self.card_repository.delete(id).await?;

        tracing::info!(card_id = %id, deleted_by = %requested_by.subject, "Card deleted");
        Ok(card)
    }

    async fn set_biz_number(
        &self,
        id: &CardId,
        biz_number: BizNumber,
        requested_by: &Identity,
    ) -> Result<Card, CardError> {
        authorize(Some(requested_by), &Requirement::AdminOnly)?;

        let mut card = self.find(id).await?;
        if let Some(holder) = self.card_repository.find_by_biz_number(biz_number).await? {
            if holder.id != card.id {
                return Err(CardError::BizNumberAlreadyExists(biz_number.value()));
            }
        }

        card.biz_number = biz_number;
        card.updated_at = self.clock.now();
        self.card_repository.update(card).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::AuthorizationError;
    use auth::RoleFlags;
    use chrono::DateTime;
    use chrono::TimeZone;
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::card::models::fixtures;
    use crate::domain::card::models::CardText;
    use crate::domain::clock::ManualClock;
    use crate::domain::common::models::Address;
    use crate::domain::common::models::EmailAddress;
    use crate::domain::common::models::Image;
    use crate::domain::common::models::Phone;

    mock! {
        pub TestCardRepository {}

        #[async_trait]
        impl CardRepository for TestCardRepository {
            async fn create(&self, card: Card) -> Result<Card, CardError>;
            async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, CardError>;
            async fn list(&self, search: Option<String>) -> Result<Vec<Card>, CardError>;
            async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Card>, CardError>;
            async fn find_by_biz_number(&self, biz_number: BizNumber) -> Result<Option<Card>, CardError>;
            async fn update(&self, card: Card) -> Result<Card, CardError>;
            async fn delete(&self, id: &CardId) -> Result<(), CardError>;
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn service(repository: MockTestCardRepository) -> CardService<MockTestCardRepository> {
        CardService::new(Arc::new(repository), Arc::new(ManualClock::new(start())))
    }

    fn identity(id: &UserId, is_business: bool, is_admin: bool) -> Identity {
        Identity {
            subject: id.to_string(),
            roles: RoleFlags::new(is_business, is_admin),
            issued_at: 0,
        }
    }

    fn create_command() -> CreateCardCommand {
        CreateCardCommand {
            text: CardText::new("Bakery", "Fresh bread", "Sourdough every morning").unwrap(),
            phone: Phone::new("0501234567".to_string()).unwrap(),
            email: EmailAddress::new("bakery@example.com".to_string()).unwrap(),
            web: String::new(),
            image: Image::card_default(),
            address: Address::new("", "Israel", "Tel Aviv", "Dizengoff", 10, "").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_card_as_business() {
        let mut repository = MockTestCardRepository::new();
        let owner = UserId::new();

        repository
            .expect_find_by_biz_number()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(move |card| card.user_id == owner && card.likes.is_empty())
            .times(1)
            .returning(|card| Ok(card));

        let service = service(repository);
        let card = service
            .create_card(create_command(), &identity(&owner, true, false))
            .await
            .unwrap();

        assert_eq!(card.user_id, owner);
        assert!((BizNumber::MIN..=BizNumber::MAX).contains(&card.biz_number.value()));
    }

    #[tokio::test]
    async fn test_card_timestamps_come_from_clock() {
        let mut repository = MockTestCardRepository::new();
        let owner = UserId::new();
        let mut existing = fixtures::card(owner);
        let card_id = existing.id;
        existing.created_at = start() - chrono::Duration::days(1);
        existing.updated_at = existing.created_at;

        repository
            .expect_find_by_biz_number()
            .returning(|_| Ok(None));
        repository.expect_create().returning(|card| Ok(card));
        repository
            .expect_find_by_id()
            .with(eq(card_id))
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_update().returning(|card| Ok(card));

        let clock = Arc::new(ManualClock::new(start()));
        let service = CardService::new(Arc::new(repository), clock.clone());
        let caller = identity(&owner, true, false);

        let created = service.create_card(create_command(), &caller).await.unwrap();
        assert_eq!(created.created_at, start());
        assert_eq!(created.updated_at, start());

        clock.advance(chrono::Duration::minutes(5));
        let updated = service
            .set_biz_number(
                &card_id,
                BizNumber::new(7_654_321).unwrap(),
                &identity(&owner, false, true),
            )
            .await
            .unwrap();
        assert_eq!(updated.created_at, start() - chrono::Duration::days(1));
        assert_eq!(updated.updated_at, start() + chrono::Duration::minutes(5));
    }

    #[tokio::test]
    async fn test_create_card_requires_business_or_admin() {
        let mut repository = MockTestCardRepository::new();
        repository.expect_create().times(0);

        let service = service(repository);
        let result = service
            .create_card(create_command(), &identity(&UserId::new(), false, false))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            CardError::Forbidden(AuthorizationError::BusinessOrAdminRequired)
        ));
    }

    #[tokio::test]
    async fn test_create_card_redraws_taken_numbers() {
        let mut repository = MockTestCardRepository::new();
        let owner = UserId::new();
        let holder = fixtures::card(UserId::new());

        let mut draws = 0;
        repository
            .expect_find_by_biz_number()
            .times(2)
            .returning(move |_| {
                draws += 1;
                Ok((draws == 1).then(|| holder.clone()))
            });
        repository
            .expect_create()
            .times(1)
            .returning(|card| Ok(card));

        let service = service(repository);
        assert!(service
            .create_card(create_command(), &identity(&owner, false, true))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_card_gives_up_eventually() {
        let mut repository = MockTestCardRepository::new();
        let holder = fixtures::card(UserId::new());

        repository
            .expect_find_by_biz_number()
            .returning(move |_| Ok(Some(holder.clone())));
        repository.expect_create().times(0);

        let service = service(repository);
        let result = service
            .create_card(create_command(), &identity(&UserId::new(), true, false))
            .await;

        assert!(matches!(result.unwrap_err(), CardError::BizNumberExhausted));
    }

    #[tokio::test]
    async fn test_update_card_by_non_owner_is_forbidden() {
        let mut repository = MockTestCardRepository::new();
        let card = fixtures::card(UserId::new());
        let card_id = card.id;

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(card.clone())));
        repository.expect_update().times(0);

        let service = service(repository);
        let result = service
            .update_card(
                &card_id,
                UpdateCardCommand::default(),
                &identity(&UserId::new(), true, false),
            )
            .await;

        assert!(matches!(
            result.unwrap_err(),
            CardError::Forbidden(AuthorizationError::OwnerOrAdminRequired)
        ));
    }

    #[tokio::test]
    async fn test_update_card_by_owner() {
        let mut repository = MockTestCardRepository::new();
        let owner = UserId::new();
        let card = fixtures::card(owner);
        let card_id = card.id;

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(card.clone())));
        repository
            .expect_update()
            .withf(|card| card.text.title == "Patisserie")
            .times(1)
            .returning(|card| Ok(card));

        let service = service(repository);
        let command = UpdateCardCommand {
            title: Some("Patisserie".to_string()),
            ..UpdateCardCommand::default()
        };
        let updated = service
            .update_card(&card_id, command, &identity(&owner, false, false))
            .await
            .unwrap();

        assert_eq!(updated.text.title, "Patisserie");
    }

    #[tokio::test]
    async fn test_admin_deletes_any_card() {
        let mut repository = MockTestCardRepository::new();
        let card = fixtures::card(UserId::new());
        let card_id = card.id;

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(card.clone())));
        repository
            .expect_delete()
            .with(eq(card_id))
            .times(1)
            .returning(|_| Ok(()));

        let service = service(repository);
        let deleted = service
            .delete_card(&card_id, &identity(&UserId::new(), false, true))
            .await
            .unwrap();

        assert_eq!(deleted.id, card_id);
    }

    #[tokio::test]
    async fn test_toggle_like() {
        let mut repository = MockTestCardRepository::new();
        let card = fixtures::card(UserId::new());
        let card_id = card.id;
        let fan = UserId::new();

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(card.clone())));
        repository
            .expect_update()
            .withf(move |card| card.likes == vec![fan])
            .times(1)
            .returning(|card| Ok(card));

        let service = service(repository);
        let toggle = service
            .toggle_like(&card_id, &identity(&fan, false, false))
            .await
            .unwrap();

        assert!(toggle.is_liked);
        assert_eq!(toggle.card.likes_count(), 1);
    }

    #[tokio::test]
    async fn test_get_card_not_found() {
        let mut repository = MockTestCardRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));

        let service = service(repository);
        let result = service.get_card(&CardId::new()).await;

        assert!(matches!(result.unwrap_err(), CardError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_biz_number_requires_admin() {
        let repository = MockTestCardRepository::new();
        let service = service(repository);

        let result = service
            .set_biz_number(
                &CardId::new(),
                BizNumber::new(2_000_000).unwrap(),
                &identity(&UserId::new(), true, false),
            )
            .await;

        assert!(matches!(
            result.unwrap_err(),
            CardError::Forbidden(AuthorizationError::AdminRequired)
        ));
    }

    #[tokio::test]
    async fn test_set_biz_number_conflict() {
        let mut repository = MockTestCardRepository::new();
        let card = fixtures::card(UserId::new());
        let card_id = card.id;
        let holder = fixtures::card(UserId::new());

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(card.clone())));
        repository
            .expect_find_by_biz_number()
            .returning(move |_| Ok(Some(holder.clone())));
        repository.expect_update().times(0);

        let service = service(repository);
        let result = service
            .set_biz_number(
                &card_id,
                BizNumber::new(2_000_000).unwrap(),
                &identity(&UserId::new(), false, true),
            )
            .await;

        assert!(matches!(
            result.unwrap_err(),
            CardError::BizNumberAlreadyExists(2_000_000)
        ));
    }

    #[tokio::test]
    async fn test_list_cards_ignores_blank_search() {
        let mut repository = MockTestCardRepository::new();
        repository
            .expect_list()
            .withf(|search| search.is_none())
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = service(repository);
        assert!(service.list_cards(Some("   ")).await.unwrap().is_empty());
    }
}
