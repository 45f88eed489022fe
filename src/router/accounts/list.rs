//! List every account.

use axum::Json;
use axum::extract::State;

use crate::Database;
use crate::account::Account;
use crate::error::Result;

pub async fn handler(State(db): State<Database>) -> Result<Json<Vec<Account>>> {
    tracing::info!("request to list all accounts");

    let accounts = db.accounts.all().await?;
    tracing::info!(count = accounts.len(), "returning accounts");

    Ok(Json(accounts))
}
