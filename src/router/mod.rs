//! HTTP routes and request extractors.
pub mod accounts;
pub mod status;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header;
use axum::http::request::Parts;
use serde_json::Value;
use validator::ValidationErrors;

use crate::ServerError;

/// Only media type accepted on mutating routes.
pub const JSON: &str = "application/json";

/// Raw JSON body of a request declaring exactly `Content-Type: application/json`.
///
/// Any other content type, including parameters such as `charset`, is
/// rejected with `415 Unsupported Media Type` before the body is read.
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());

        if content_type != Some(JSON) {
            tracing::error!(?content_type, "invalid Content-Type");
            return Err(ServerError::UnsupportedMediaType { expected: JSON });
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ServerError::ParsingForm(Box::new(err)))?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|err| ServerError::ParsingForm(Box::new(err)))?;

        Ok(Self(value))
    }
}

/// JSON body converted into a typed, validated `T`.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: TryFrom<Value, Error = ValidationErrors> + Send,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::from_request(req, state).await?;
        Ok(Self(T::try_from(value)?))
    }
}

/// Positive integer identifier taken from the `{id}` path segment.
///
/// Anything else cannot name an account and is answered with `404`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountId(pub i32);

impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ServerError::NotFound {
                details: "Resource not found.".into(),
            })?;

        match raw.parse::<i32>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ServerError::account_not_found(raw)),
        }
    }
}

/// Fallback for unknown paths.
pub async fn not_found(uri: axum::http::Uri) -> ServerError {
    ServerError::NotFound {
        details: format!("No route for {}.", uri.path()),
    }
}

/// Fallback for known paths called with an unsupported method.
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

/// Application state backed by an empty in-memory store.
#[cfg(test)]
pub fn state() -> crate::AppState {
    crate::AppState {
        config: std::sync::Arc::new(crate::config::Configuration::default()),
        db: crate::Database::memory(),
        metrics: None,
    }
}
