//! Delete an account.

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::router::AccountId;
use crate::{Database, ServerError};

pub async fn handler(
    State(db): State<Database>,
    AccountId(id): AccountId,
) -> Result<StatusCode> {
    tracing::info!(id, "request to delete an account");

    if db.accounts.find(id).await?.is_none() {
        return Err(ServerError::account_not_found(id));
    }
    db.accounts.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
