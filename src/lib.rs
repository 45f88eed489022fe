//! Account REST API service.
//!
//! Manages the lifecycle of customer accounts (create, list, read, update,
//! delete) over HTTP/JSON, persisted in PostgreSQL.
#![forbid(unsafe_code)]

pub mod account;
pub mod config;
mod database;
pub mod error;
mod middleware;
mod router;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

pub use database::Database;
pub use error::ServerError;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: axum::http::Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    make_request_with_type(app, method, path, Some("application/json"), body)
        .await
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request_with_type(
    app: Router,
    method: axum::http::Method,
    path: &str,
    content_type: Option<&str>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder().method(method).uri(path);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: Database,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let security = &state.config.security;
    let csp = HeaderValue::from_str(&security.content_security_policy)
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid `content_security_policy`, using default");
            HeaderValue::from_static("default-src 'self'; object-src 'none'")
        });

    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(middleware::cors(security))
        // Fixed security headers on every response.
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    Router::new()
        // `GET /` goes to `index`.
        .route("/", get(router::status::index))
        // `GET /health` goes to `health`.
        .route("/health", get(router::status::health))
        // `GET /metrics` renders Prometheus metrics, if enabled.
        .route("/metrics", get(router::status::metrics))
        .merge(router::accounts::router())
        .fallback(router::not_found)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(AxumMiddleware::from_fn_with_state(
            state.clone(),
            middleware::force_https,
        ))
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let db = match config.postgres {
        Some(ref postgres) => Database::postgres(postgres).await?,
        None => {
            tracing::warn!(
                "missing `postgres` entry on `config.yaml` and `{}` variable, accounts are kept in memory",
                config::DATABASE_URI
            );
            Database::memory()
        },
    };

    let metrics = if config.telemetry.prometheus {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    Ok(AppState {
        config,
        db,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::*;

    #[tokio::test]
    async fn test_security_headers() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = [
            ("x-frame-options", "SAMEORIGIN"),
            ("x-xss-protection", "1; mode=block"),
            ("x-content-type-options", "nosniff"),
            (
                "content-security-policy",
                "default-src 'self'; object-src 'none'",
            ),
            ("referrer-policy", "strict-origin-when-cross-origin"),
        ];
        for (name, value) in headers {
            assert_eq!(response.headers()[name], value, "{name}");
        }
    }

    #[tokio::test]
    async fn test_cors() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/users", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
    }
}
