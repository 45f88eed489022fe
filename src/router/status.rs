//! Service index, health and metrics.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::{AppState, ServerError};

/// Service identification.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub version: String,
}

/// Liveness answer.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// Root URL response.
pub async fn index(State(config): State<Arc<Configuration>>) -> Json<Index> {
    Json(Index {
        name: config.name.clone(),
        version: config.version.clone(),
    })
}

/// Health status.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "OK".into(),
    })
}

/// Prometheus exposition, `404` when the recorder is disabled.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => ServerError::NotFound {
            details: "Metrics are disabled.".into(),
        }
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    use super::*;
    use crate::*;

    #[tokio::test]
    async fn test_index() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Index = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.name, "Account REST API Service");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/health", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Health = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, "OK");
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/metrics", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
