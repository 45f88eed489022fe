//! Account persistence port.

use async_trait::async_trait;

use super::{Account, AccountPayload};

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Errors raised by an [`AccountRepository`].
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("account {id} does not exist")]
    NotFound { id: i32 },

    #[error("store request failed")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub trait ToPersistence<T> {
    fn catch(self) -> Result<T>;
}

impl<T, E> ToPersistence<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn catch(self) -> Result<T> {
        self.map_err(|e| PersistenceError::Store(Box::new(e)))
    }
}

/// Port for account persistence operations.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account and return it with its assigned `id`.
    async fn create(&self, account: &AccountPayload) -> Result<Account>;

    /// Find an account by `id`. Absence is not an error.
    async fn find(&self, id: i32) -> Result<Option<Account>>;

    /// Every account, ordered by `id`.
    async fn all(&self) -> Result<Vec<Account>>;

    /// Overwrite an existing account.
    async fn update(&self, account: &Account) -> Result<Account>;

    /// Remove an account. Removing a missing account is a no-op.
    async fn delete(&self, id: i32) -> Result<()>;
}
