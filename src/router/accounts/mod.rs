//! Accounts-related HTTP API.
mod create;
mod delete;
mod list;
mod read;
mod update;

use axum::Router;
use axum::routing::get;

use crate::AppState;
use crate::router::method_not_allowed;

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /accounts` goes to `list`, `POST /accounts` to `create`.
        .route(
            "/accounts",
            get(list::handler)
                .post(create::handler)
                .fallback(method_not_allowed),
        )
        // `GET`, `PUT` and `DELETE /accounts/{id}`.
        .route(
            "/accounts/{id}",
            get(read::handler)
                .put(update::handler)
                .delete(delete::handler)
                .fallback(method_not_allowed),
        )
}
