//! Create an account.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};

use crate::AppState;
use crate::account::{Account, AccountPayload};
use crate::error::Result;
use crate::router::Valid;

/// Handler to create account.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<AccountPayload>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Account>)> {
    tracing::info!("request to create an account");

    let account = state.db.accounts.create(&body).await?;
    let location = format!("{}/accounts/{}", state.config.url, account.id);

    tracing::info!(id = account.id, "account created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(account),
    ))
}
