//! Store selection and connection.
use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::AppState;
use crate::account::{
    AccountRepository, MemoryAccountRepository, PgAccountRepository,
};
use crate::config::Postgres;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "postgres";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while opening the store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot connect to postgres: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub accounts: Arc<dyn AccountRepository>,
}

impl Database {
    /// Connect to PostgreSQL and run pending migrations.
    pub async fn postgres(config: &Postgres) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size.unwrap_or(DEFAULT_POOL_SIZE))
            .connect(&config.connection_string())
            .await?;

        tracing::info!(address = %config.address, "postgres connected");

        // execute migrations scripts on start.
        sqlx::migrate!().run(&pool).await?;

        Ok(Self::from_pool(pool))
    }

    /// Use an already opened pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            accounts: Arc::new(PgAccountRepository::new(pool)),
        }
    }

    /// Volatile store, lost on restart.
    pub fn memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccountRepository::new()),
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}
