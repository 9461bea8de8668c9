use async_trait::async_trait;
use auth::Identity;

use crate::domain::common::models::EmailAddress;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account and sign it in.
    ///
    /// # Arguments
    /// * `command` - Validated registration data
    ///
    /// # Returns
    /// Created user and a freshly issued token
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<Session, UserError>;

    /// Check credentials and issue a token.
    ///
    /// Unknown email and wrong password are reported identically.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `AccountLocked` - Too many failed attempts, lock still active
    /// * `DatabaseError` - Attempt state could not be persisted
    async fn login(&self, email: &EmailAddress, password: &str) -> Result<Session, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Errors
    /// * `NotFound` - No user with this email
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, UserError>;

    /// Retrieve all users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Update profile fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `InvalidField` - Merged name or address is invalid
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Set or clear the business flag.
    async fn set_business_status(&self, id: &UserId, is_business: bool)
        -> Result<User, UserError>;

    /// Set or clear the admin flag.
    async fn set_admin_status(&self, id: &UserId, is_admin: bool) -> Result<User, UserError>;

    /// Replace the password after checking the current one.
    ///
    /// The current password goes through the same attempt counting as login.
    ///
    /// # Errors
    /// * `IncorrectCurrentPassword` - Current password does not match
    /// * `AccountLocked` - Lock is active
    /// * `NotFound` - User does not exist
    async fn change_password(
        &self,
        id: &UserId,
        current: &str,
        new: Password,
    ) -> Result<(), UserError>;

    /// Clear failed attempts and any lock.
    async fn unlock_account(&self, id: &UserId) -> Result<(), UserError>;

    /// Delete existing user and, through the store, their cards.
    ///
    /// # Arguments
    /// * `id` - User ID to delete
    /// * `requested_by` - Identity of the caller
    ///
    /// # Errors
    /// * `AdminSelfDeletion` - An admin tried to delete their own account
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId, requested_by: &Identity) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
///
/// `update` writes profile and role fields only; credential state goes
/// through [`CredentialStore`].
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by (lower-cased) email address.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve all users, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

/// Per-account password hash and failed-login state.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Load credential state, `None` if the account does not exist.
    async fn load_credentials(&self, id: &UserId) -> Result<Option<Credentials>, UserError>;

    /// Overwrite credential state.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Write failed
    async fn save_credentials(&self, id: &UserId, credentials: &Credentials)
        -> Result<(), UserError>;
}
