use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::records::AddressRecord;
use super::records::ImageRecord;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Phone;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialStore;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = r#"
    id, first_name, middle_name, last_name, phone, email, image, address,
    is_business, is_admin, password_hash, login_attempts, lock_until,
    created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    middle_name: String,
    last_name: String,
    phone: String,
    email: String,
    image: Json<ImageRecord>,
    address: Json<AddressRecord>,
    is_business: bool,
    is_admin: bool,
    password_hash: String,
    login_attempts: i32,
    lock_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(r.id),
            name: PersonName::new(&r.first_name, &r.middle_name, &r.last_name)?,
            phone: Phone::new(r.phone)?,
            email: EmailAddress::new(r.email)?,
            image: r.image.0.into(),
            address: r.address.0.try_into()?,
            is_business: r.is_business,
            is_admin: r.is_admin,
            credentials: Credentials {
                password_hash: r.password_hash,
                login_attempts: u32::try_from(r.login_attempts).unwrap_or_default(),
                lock_until: r.lock_until,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    password_hash: String,
    login_attempts: i32,
    lock_until: Option<DateTime<Utc>>,
}

fn map_write_error(e: sqlx::Error, user: &User) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return UserError::EmailAlreadyExists(user.email.as_str().to_string());
        }
    }
    UserError::DatabaseError(e.to_string())
}

fn db_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, first_name, middle_name, last_name, phone, email, image, address,
                is_business, is_admin, password_hash, login_attempts, lock_until,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.name.first)
        .bind(&user.name.middle)
        .bind(&user.name.last)
        .bind(user.phone.as_str())
        .bind(user.email.as_str())
        .bind(Json(ImageRecord::from(&user.image)))
        .bind(Json(AddressRecord::from(&user.address)))
        .bind(user.is_business)
        .bind(user.is_admin)
        .bind(&user.credentials.password_hash)
        .bind(i32::try_from(user.credentials.login_attempts).unwrap_or(i32::MAX))
        .bind(user.credentials.lock_until)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, middle_name = $3, last_name = $4, phone = $5,
                email = $6, image = $7, address = $8, is_business = $9,
                is_admin = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(&user.name.first)
        .bind(&user.name.middle)
        .bind(&user.name.last)
        .bind(user.phone.as_str())
        .bind(user.email.as_str())
        .bind(Json(ImageRecord::from(&user.image)))
        .bind(Json(AddressRecord::from(&user.address)))
        .bind(user.is_business)
        .bind(user.is_admin)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        // Credential columns are not written here; return what is stored.
        self.find_by_id(&user.id)
            .await?
            .ok_or(UserError::NotFound(user.id.to_string()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PostgresUserRepository {
    async fn load_credentials(&self, id: &UserId) -> Result<Option<Credentials>, UserError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT password_hash, login_attempts, lock_until
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|r| Credentials {
            password_hash: r.password_hash,
            login_attempts: u32::try_from(r.login_attempts).unwrap_or_default(),
            lock_until: r.lock_until,
        }))
    }

    async fn save_credentials(
        &self,
        id: &UserId,
        credentials: &Credentials,
    ) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, login_attempts = $3, lock_until = $4
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(&credentials.password_hash)
        .bind(i32::try_from(credentials.login_attempts).unwrap_or(i32::MAX))
        .bind(credentials.lock_until)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
