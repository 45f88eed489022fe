//! Read an account.

use axum::Json;
use axum::extract::State;

use crate::account::Account;
use crate::error::Result;
use crate::router::AccountId;
use crate::{Database, ServerError};

pub async fn handler(
    State(db): State<Database>,
    AccountId(id): AccountId,
) -> Result<Json<Account>> {
    tracing::info!(id, "request to read an account");

    match db.accounts.find(id).await? {
        Some(account) => Ok(Json(account)),
        None => Err(ServerError::account_not_found(id)),
    }
}
