use std::sync::Arc;

use async_trait::async_trait;
use auth::Identity;
use auth::LockoutPolicy;
use auth::PasswordHasher;
use auth::TokenIssuer;

use crate::domain::clock::Clock;
use crate::domain::common::models::EmailAddress;
use crate::domain::common::models::Image;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::verifier::hash_password;
use crate::domain::user::verifier::PasswordVerifier;
use crate::user::errors::UserError;
use crate::user::ports::CredentialStore;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository + CredentialStore,
{
    repository: Arc<UR>,
    verifier: PasswordVerifier<UR>,
    token_issuer: Arc<TokenIssuer>,
    password_hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository + CredentialStore,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User and credential persistence implementation
    /// * `token_issuer` - Signs tokens handed out at registration and login
    /// * `password_hasher` - Hasher configured with the service's cost
    /// * `policy` - Failed-login threshold and lock duration
    /// * `clock` - Time source for lock and token timestamps
    pub fn new(
        repository: Arc<UR>,
        token_issuer: Arc<TokenIssuer>,
        password_hasher: PasswordHasher,
        policy: LockoutPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let verifier = PasswordVerifier::new(
            repository.clone(),
            password_hasher.clone(),
            policy,
            clock.clone(),
        );

        Self {
            repository,
            verifier,
            token_issuer,
            password_hasher,
            clock,
        }
    }

    fn start_session(&self, user: User) -> Result<Session, UserError> {
        let token = self
            .token_issuer
            .issue_at(user.id, user.roles(), self.clock.now())?;
        Ok(Session { user, token })
    }

    async fn find(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository + CredentialStore,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<Session, UserError> {
        let password_hash = hash_password(&self.password_hasher, command.password.as_str()).await?;
        let now = self.clock.now();

        let user = User {
            id: UserId::new(),
            name: command.name,
            phone: command.phone,
            email: command.email,
            image: command.image,
            address: command.address,
            is_business: command.is_business,
            is_admin: false,
            credentials: Credentials::new(password_hash),
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        self.start_session(created_user)
    }

    async fn login(&self, email: &EmailAddress, password: &str) -> Result<Session, UserError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            tracing::warn!("Login attempt for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !self.verifier.verify(&user.id, password).await? {
            return Err(UserError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.start_session(user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.find(id).await
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFound(email.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self.find(id).await?;

        user.name = user.name.patched(
            command.first_name.as_deref(),
            command.middle_name.as_deref(),
            command.last_name.as_deref(),
        )?;
        user.address = user.address.patched(command.address)?;

        if command.image_url.is_some() || command.image_alt.is_some() {
            user.image = Image::new(
                command.image_url.or(Some(user.image.url)),
                command.image_alt.or(Some(user.image.alt)),
                (Image::DEFAULT_USER_URL, Image::DEFAULT_USER_ALT),
            )?;
        }

        if let Some(phone) = command.phone {
            user.phone = phone;
        }

        if let Some(email) = command.email {
            user.email = email;
        }

        user.updated_at = self.clock.now();
        self.repository.update(user).await
    }

    async fn set_business_status(
        &self,
        id: &UserId,
        is_business: bool,
    ) -> Result<User, UserError> {
        let mut user = self.find(id).await?;
        user.is_business = is_business;
        user.updated_at = self.clock.now();
        self.repository.update(user).await
    }

    async fn set_admin_status(&self, id: &UserId, is_admin: bool) -> Result<User, UserError> {
        let mut user = self.find(id).await?;
        user.is_admin = is_admin;
        user.updated_at = self.clock.now();

        let user = self.repository.update(user).await?;
        tracing::info!(user_id = %user.id, is_admin, "Admin status changed");
        Ok(user)
    }

    async fn change_password(
        &self,
        id: &UserId,
        current: &str,
        new: Password,
    ) -> Result<(), UserError> {
        if !self.verifier.verify(id, current).await? {
            return Err(UserError::IncorrectCurrentPassword);
        }

        let password_hash = hash_password(&self.password_hasher, new.as_str()).await?;
        self.verifier.replace_hash(id, password_hash).await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn unlock_account(&self, id: &UserId) -> Result<(), UserError> {
        self.verifier.unlock(id).await
    }

    async fn delete_user(&self, id: &UserId, requested_by: &Identity) -> Result<(), UserError> {
        if requested_by.is_admin()
            && requested_by
                .subject
                .trim()
                .eq_ignore_ascii_case(&id.to_string())
        {
            return Err(UserError::AdminSelfDeletion);
        }

        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, deleted_by = %requested_by.subject, "User deleted");

        Ok(())
    }
}
