use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::records::AddressRecord;
use super::records::ImageRecord;
use crate::domain::card::errors::CardError;
use crate::domain::card::models::BizNumber;
use crate::domain::card::models::Card;
use crate::domain::card::models::CardId;
use crate::domain::card::models::CardText;
use crate::domain::card::ports::CardRepository;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Phone;
use crate::domain::user::models::UserId;

const CARD_COLUMNS: &str = r#"
    id, title, subtitle, description, phone, email, web, image, address,
    biz_number, likes, user_id, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct CardRow {
    id: Uuid,
    title: String,
    subtitle: String,
    description: String,
    phone: String,
    email: String,
    web: String,
    image: Json<ImageRecord>,
    address: Json<AddressRecord>,
    biz_number: i32,
    likes: Vec<Uuid>,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CardRow> for Card {
    type Error = CardError;

    fn try_from(r: CardRow) -> Result<Self, Self::Error> {
        Ok(Card {
            id: CardId(r.id),
            text: CardText::new(&r.title, &r.subtitle, &r.description)?,
            phone: Phone::new(r.phone)?,
            email: EmailAddress::new(r.email)?,
            web: r.web,
            image: r.image.0.into(),
            address: r.address.0.try_into()?,
            biz_number: BizNumber::new(i64::from(r.biz_number))?,
            likes: r.likes.into_iter().map(UserId).collect(),
            user_id: UserId(r.user_id),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn map_write_error(e: sqlx::Error, card: &Card) -> CardError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("cards_biz_number_key") {
            return CardError::BizNumberAlreadyExists(card.biz_number.value());
        }
    }
    CardError::DatabaseError(e.to_string())
}

fn db_error(e: sqlx::Error) -> CardError {
    CardError::DatabaseError(e.to_string())
}

/// `%term%` with LIKE wildcards in `term` escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn likes_column(card: &Card) -> Vec<Uuid> {
    card.likes.iter().map(|id| id.0).collect()
}

pub struct PostgresCardRepository {
    pool: PgPool,
}

impl PostgresCardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardRepository for PostgresCardRepository {
    async fn create(&self, card: Card) -> Result<Card, CardError> {
        sqlx::query(
            r#"
            INSERT INTO cards (
                id, title, subtitle, description, phone, email, web, image, address,
                biz_number, likes, user_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(card.id.0)
        .bind(&card.text.title)
        .bind(&card.text.subtitle)
        .bind(&card.text.description)
        .bind(card.phone.as_str())
        .bind(card.email.as_str())
        .bind(&card.web)
        .bind(Json(ImageRecord::from(&card.image)))
        .bind(Json(AddressRecord::from(&card.address)))
        .bind(card.biz_number.value() as i32)
        .bind(likes_column(&card))
        .bind(card.user_id.0)
        .bind(card.created_at)
        .bind(card.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &card))?;

        Ok(card)
    }

    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, CardError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1");
        sqlx::query_as::<_, CardRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Card::try_from)
            .transpose()
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<Card>, CardError> {
        let rows = match search {
            Some(term) => {
                let sql = format!(
                    "SELECT {CARD_COLUMNS} FROM cards
                     WHERE title ILIKE $1 OR subtitle ILIKE $1 OR description ILIKE $1
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, CardRow>(&sql)
                    .bind(contains_pattern(&term))
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY created_at DESC");
                sqlx::query_as::<_, CardRow>(&sql)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_error)?;

        rows.into_iter().map(Card::try_from).collect()
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Card>, CardError> {
        let sql =
            format!("SELECT {CARD_COLUMNS} FROM cards WHERE user_id = $1 ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, CardRow>(&sql)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(Card::try_from).collect()
    }

    async fn find_by_biz_number(&self, biz_number: BizNumber) -> Result<Option<Card>, CardError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE biz_number = $1");
        sqlx::query_as::<_, CardRow>(&sql)
            .bind(biz_number.value() as i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Card::try_from)
            .transpose()
    }

    async fn update(&self, card: Card) -> Result<Card, CardError> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET title = $2, subtitle = $3, description = $4, phone = $5, email = $6,
                web = $7, image = $8, address = $9, biz_number = $10, likes = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(card.id.0)
        .bind(&card.text.title)
        .bind(&card.text.subtitle)
        .bind(&card.text.description)
        .bind(card.phone.as_str())
        .bind(card.email.as_str())
        .bind(&card.web)
        .bind(Json(ImageRecord::from(&card.image)))
        .bind(Json(AddressRecord::from(&card.address)))
        .bind(card.biz_number.value() as i32)
        .bind(likes_column(&card))
        .bind(card.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &card))?;

        if result.rows_affected() == 0 {
            return Err(CardError::NotFound(card.id));
        }

        Ok(card)
    }

    async fn delete(&self, id: &CardId) -> Result<(), CardError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(CardError::NotFound(*id));
        }

        Ok(())
    }
}
