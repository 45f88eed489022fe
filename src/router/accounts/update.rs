//! Update an existing account.

use axum::Json;
use axum::extract::State;

use crate::account::{Account, AccountPayload};
use crate::error::Result;
use crate::router::{AccountId, JsonBody};
use crate::{Database, ServerError};

/// Existence is checked before the body is validated: an invalid body sent
/// to a missing account is a `404`.
pub async fn handler(
    State(db): State<Database>,
    AccountId(id): AccountId,
    JsonBody(body): JsonBody,
) -> Result<Json<Account>> {
    tracing::info!(id, "request to update an account");

    let Some(mut account) = db.accounts.find(id).await? else {
        return Err(ServerError::account_not_found(id));
    };

    account.apply(AccountPayload::try_from(body)?);
    let account = db.accounts.update(&account).await?;

    Ok(Json(account))
}
