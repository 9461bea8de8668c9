use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use auth::LockoutPolicy;
use auth::PasswordHasher;
use tokio::sync::OwnedMutexGuard;

use crate::domain::clock::Clock;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::CredentialStore;

/// One async mutex per account, created on demand.
///
/// Entries nobody holds or waits on are dropped on the next acquire.
#[derive(Debug, Default)]
pub struct AccountLocks {
    inner: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash `password` on the blocking pool.
pub async fn hash_password(hasher: &PasswordHasher, password: &str) -> Result<String, UserError> {
    let hasher = hasher.clone();
    let password = password.to_string();

    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| UserError::Unknown(format!("Hashing task failed: {}", e)))?
        .map_err(UserError::from)
}

/// Checks candidate passwords and keeps the failed-attempt counter and lock
/// for each account.
///
/// All reads and writes of one account's credential state happen under that
/// account's entry in [`AccountLocks`], so concurrent attempts cannot lose
/// updates. The hash comparison runs on the blocking pool and holds no
/// process-wide lock.
pub struct PasswordVerifier<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    hasher: PasswordHasher,
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
    locks: AccountLocks,
}

impl<CS> PasswordVerifier<CS>
where
    CS: CredentialStore,
{
    pub fn new(
        store: Arc<CS>,
        hasher: PasswordHasher,
        policy: LockoutPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            policy,
            clock,
            locks: AccountLocks::new(),
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Compare `candidate` with the stored hash of account `id`.
    ///
    /// A mismatch is counted and persisted before `false` is returned; a
    /// match clears any attempts and lock, and is only reported once that
    /// write succeeded.
    ///
    /// # Errors
    /// * `AccountLocked` - Lock is active; nothing is compared or counted
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Credential state could not be read or written
    pub async fn verify(&self, id: &UserId, candidate: &str) -> Result<bool, UserError> {
        let _guard = self.locks.acquire(*id).await;

        let mut credentials = self
            .store
            .load_credentials(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        if credentials.is_locked(self.clock.now()) {
            tracing::warn!(user_id = %id, lock_until = ?credentials.lock_until, "Login attempt on locked account");
            return Err(UserError::AccountLocked);
        }

        let hasher = self.hasher.clone();
        let candidate = candidate.to_string();
        let hash = credentials.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&candidate, &hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Verification task failed: {}", e)))??;

        if matches {
            if credentials.reset() {
                self.persist(id, &credentials).await?;
            }
            return Ok(true);
        }

        let locked = credentials.record_failure(&self.policy, self.clock.now());
        self.persist(id, &credentials).await?;

        if locked {
            tracing::warn!(
                user_id = %id,
                attempts = credentials.login_attempts,
                lock_until = ?credentials.lock_until,
                "Account locked after repeated login failures"
            );
        } else {
            tracing::warn!(user_id = %id, attempts = credentials.login_attempts, "Login failed");
        }

        Ok(false)
    }

    /// Store a new password hash for account `id`.
    pub async fn replace_hash(&self, id: &UserId, password_hash: String) -> Result<(), UserError> {
        let _guard = self.locks.acquire(*id).await;

        let mut credentials = self
            .store
            .load_credentials(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        credentials.password_hash = password_hash;

        self.persist(id, &credentials).await
    }

    /// Clear failed attempts and any lock on account `id`.
    pub async fn unlock(&self, id: &UserId) -> Result<(), UserError> {
        let _guard = self.locks.acquire(*id).await;

        let mut credentials = self
            .store
            .load_credentials(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        if credentials.reset() {
            self.persist(id, &credentials).await?;
            tracing::info!(user_id = %id, "Account unlocked");
        }
        Ok(())
    }

    async fn persist(
        &self,
        id: &UserId,
        credentials: &Credentials,
    ) -> Result<(), UserError> {
        self.store
            .save_credentials(id, credentials)
            .await
            .inspect_err(|e| tracing::error!(user_id = %id, "Failed to persist credentials: {}", e))
    }
}
