//! Middlewares for routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{Configuration, Security};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// CORS layer allowing the configured origin.
pub fn cors(security: &Security) -> CorsLayer {
    let origin = match security.cors_allow_origin.as_str() {
        "*" | "" => AllowOrigin::from(Any),
        origin => match HeaderValue::from_str(origin) {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(err) => {
                tracing::warn!(error = %err, %origin, "invalid `cors_allow_origin`, allowing any origin");
                AllowOrigin::from(Any)
            },
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// Redirect requests not forwarded over HTTPS, when enabled.
pub async fn force_https(
    State(config): State<Arc<Configuration>>,
    req: Request,
    next: Next,
) -> Response {
    if !config.security.force_https {
        return next.run(req).await;
    }

    let secure = req
        .headers()
        .get(FORWARDED_PROTO)
        .and_then(|proto| proto.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));
    if secure {
        return next.run(req).await;
    }

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|host| host.to_str().ok());
    match host {
        Some(host) => {
            let path = req
                .uri()
                .path_and_query()
                .map(|p| p.as_str())
                .unwrap_or("/");
            tracing::debug!(%host, %path, "redirecting to https");
            Redirect::permanent(&format!("https://{host}{path}"))
                .into_response()
        },
        None => next.run(req).await,
    }
}
