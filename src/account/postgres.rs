//! PostgreSQL implementation for account repository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::repository::{
    AccountRepository, PersistenceError, Result, ToPersistence,
};
use super::{Account, AccountPayload};

/// PostgreSQL account repository.
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new [`PgAccountRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &AccountPayload) -> Result<Account> {
        let mut tx = self.pool.begin().await.catch()?;

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (name, email, address, phone_number, date_joined)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, address, phone_number, date_joined
            "#,
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.address)
        .bind(&account.phone_number)
        .bind(account.date_joined_or_today())
        .fetch_one(&mut *tx)
        .await
        .catch()?;

        tx.commit().await.catch()?;

        Ok(account)
    }

    async fn find(&self, id: i32) -> Result<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, address, phone_number, date_joined
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .catch()
    }

    async fn all(&self) -> Result<Vec<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, address, phone_number, date_joined
            FROM accounts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .catch()
    }

    async fn update(&self, account: &Account) -> Result<Account> {
        let mut tx = self.pool.begin().await.catch()?;

        let updated = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET
                name = $2,
                email = $3,
                address = $4,
                phone_number = $5,
                date_joined = $6
            WHERE id = $1
            RETURNING id, name, email, address, phone_number, date_joined
            "#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.address)
        .bind(&account.phone_number)
        .bind(account.date_joined)
        .fetch_optional(&mut *tx)
        .await
        .catch()?;

        // dropping `tx` rolls back.
        let Some(updated) = updated else {
            return Err(PersistenceError::NotFound { id: account.id });
        };

        tx.commit().await.catch()?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<()> {
        sqlx::query(r#"DELETE FROM accounts WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .catch()?;

        Ok(())
    }
}
