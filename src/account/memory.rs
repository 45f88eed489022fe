//! In-memory implementation for account repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::{AccountRepository, PersistenceError, Result};
use super::{Account, AccountPayload};

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, Account>,
}

/// Volatile account repository.
///
/// Ids are assigned from a counter and never reused, like a `SERIAL` column.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountRepository {
    table: Arc<RwLock<Table>>,
}

impl MemoryAccountRepository {
    /// Create an empty [`MemoryAccountRepository`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, account: &AccountPayload) -> Result<Account> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let account = Account {
            id: table.last_id,
            name: account.name.clone(),
            email: account.email.clone(),
            address: account.address.clone(),
            phone_number: account.phone_number.clone(),
            date_joined: account.date_joined_or_today(),
        };
        table.rows.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find(&self, id: i32) -> Result<Option<Account>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, account: &Account) -> Result<Account> {
        let mut table = self.table.write().await;

        match table.rows.get_mut(&account.id) {
            Some(row) => {
                row.clone_from(account);
                Ok(account.clone())
            },
            None => Err(PersistenceError::NotFound { id: account.id }),
        }
    }

    async fn delete(&self, id: i32) -> Result<()> {
        self.table.write().await.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> AccountPayload {
        AccountPayload {
            name: name.into(),
            email: format!("{name}@example.com"),
            address: "1 Main".into(),
            phone_number: None,
            date_joined: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = MemoryAccountRepository::new();

        let first = repo.create(&payload("rey")).await.unwrap();
        let second = repo.create(&payload("finn")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.date_joined, chrono::Utc::now().date_naive());
        assert_eq!(repo.find(2).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_all_is_ordered_by_id() {
        let repo = MemoryAccountRepository::new();
        assert!(repo.all().await.unwrap().is_empty());

        for name in ["a", "b", "c"] {
            repo.create(&payload(name)).await.unwrap();
        }

        let names: Vec<String> =
            repo.all().await.unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_update_missing_account_fails() {
        let repo = MemoryAccountRepository::new();
        let mut account = repo.create(&payload("rey")).await.unwrap();
        account.id = 42;

        let err = repo.update(&account).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound { id: 42 }));
        assert_eq!(repo.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = MemoryAccountRepository::new();
        let account = repo.create(&payload("rey")).await.unwrap();

        repo.delete(account.id).await.unwrap();
        repo.delete(account.id).await.unwrap();
        assert_eq!(repo.find(account.id).await.unwrap(), None);

        // ids are not reused.
        let next = repo.create(&payload("finn")).await.unwrap();
        assert_eq!(next.id, 2);
    }
}
