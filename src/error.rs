//! Error handler for the account service.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::account::PersistenceError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error("error parsing request body: {0}")]
    ParsingForm(Box<dyn std::error::Error + Send + Sync>),

    #[error("Content-Type must be {expected}")]
    UnsupportedMediaType { expected: &'static str },

    #[error("{details}")]
    NotFound { details: String },

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ServerError {
    /// No account is stored under `id`.
    pub fn account_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            details: format!("Account with id {id} not found."),
        }
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(
        self,
    ) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue.to_string(),
            })
        })
        .collect();
    // `field_errors` iterates a hash map.
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => {
                response.errors(validation_errors)
            },

            ServerError::ParsingForm(_) => {
                response.title("Request body is not valid JSON.")
            },

            ServerError::UnsupportedMediaType { .. } => response
                .title("Unsupported media type.")
                .status(StatusCode::UNSUPPORTED_MEDIA_TYPE),

            ServerError::NotFound { .. } => response
                .title("Resource not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::MethodNotAllowed => response
                .title("Method not allowed.")
                .details("The method is not allowed for the requested URL.")
                .status(StatusCode::METHOD_NOT_ALLOWED),

            // deleted by a concurrent request.
            ServerError::Persistence(PersistenceError::NotFound { .. }) => {
                response
                    .title("Resource not found.")
                    .status(StatusCode::NOT_FOUND)
            },

            ServerError::Persistence(err) => {
                tracing::error!(error = %err, source = ?std::error::Error::source(err), "store request failed");

                ResponseError::default()
            },
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
