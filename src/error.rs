// src/error.rs
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::{json, Map, Value};
use crate::database::StoreError;

#[derive(Debug)]
pub enum AppError {
    /// 400 with an optional offending field and structured details.
    ValidationError {
        message: String,
        field: Option<&'static str>,
        details: Option<Value>,
    },
    /// 400 listing every required field that was absent.
    MissingFields(Vec<&'static str>),
    Unauthorized {
        message: String,
        details: Option<String>,
    },
    Forbidden(String),
    NotFound {
        message: String,
        field: Option<&'static str>,
    },
    NotImplemented {
        message: String,
        endpoint: String,
    },
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError { message: msg.into(), field: None, details: None }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized { message: msg.into(), details: None }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound { message: msg.into(), field: None }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal { message: msg.into(), details: None }
    }

    /// 500 carrying the underlying error text in `details`.
    pub fn unexpected(msg: impl Into<String>, err: impl std::fmt::Display) -> Self {
        AppError::Internal { message: msg.into(), details: Some(err.to_string()) }
    }

    /// Attaches the request field the error refers to.
    pub fn on_field(self, name: &'static str) -> Self {
        match self {
            AppError::ValidationError { message, details, .. } => {
                AppError::ValidationError { message, field: Some(name), details }
            }
            AppError::NotFound { message, .. } => AppError::NotFound { message, field: Some(name) },
            other => other,
        }
    }

    pub fn with_details(self, value: Value) -> Self {
        match self {
            AppError::ValidationError { message, field, .. } => {
                AppError::ValidationError { message, field, details: Some(value) }
            }
            AppError::Unauthorized { message, .. } => {
                let details = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                AppError::Unauthorized { message, details: Some(details) }
            }
            AppError::Internal { message, .. } => {
                let details = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                AppError::Internal { message, details: Some(details) }
            }
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError { .. } | AppError::MissingFields(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = Map::new();

        match self {
            AppError::ValidationError { message, field, details } => {
                body.insert("error".into(), json!(message));
                if let Some(details) = details {
                    body.insert("details".into(), details);
                }
                if let Some(field) = field {
                    body.insert("field".into(), json!(field));
                }
            }
            AppError::MissingFields(fields) => {
                body.insert("error".into(), json!("Missing required fields"));
                body.insert("fields".into(), json!(fields));
            }
            AppError::Unauthorized { message, details } => {
                body.insert("error".into(), json!(message));
                if let Some(details) = details {
                    body.insert("details".into(), json!(details));
                }
            }
            AppError::Forbidden(message) => {
                body.insert("error".into(), json!(message));
            }
            AppError::NotFound { message, field } => {
                body.insert("error".into(), json!(message));
                if let Some(field) = field {
                    body.insert("field".into(), json!(field));
                }
            }
            AppError::NotImplemented { message, endpoint } => {
                body.insert("error".into(), json!(message));
                body.insert("endpoint".into(), json!(endpoint));
            }
            AppError::Internal { message, details } => {
                tracing::error!(error = %message, details = details.as_deref().unwrap_or(""), "Request failed");
                body.insert("error".into(), json!(message));
                if let Some(details) = details {
                    body.insert("details".into(), json!(details));
                }
            }
        }

        (status, Json(Value::Object(body))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Integrity(_) => AppError::unexpected("Database integrity error", err),
            StoreError::Database(_) | StoreError::Migration(_) => {
                AppError::unexpected("Database error occurred", err)
            }
        }
    }
}

/// Undecodable request bodies: wrong Content-Type, malformed JSON or
/// mistyped fields. Always a 400 so clients see the usual error shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("Invalid request body").with_details(json!(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_is_only_attached_where_it_means_something() {
        let err = AppError::validation("Invalid email format").on_field("email");
        assert!(matches!(err, AppError::ValidationError { field: Some("email"), .. }));

        let err = AppError::forbidden("nope").on_field("email");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn integrity_errors_become_500s() {
        let err: AppError = StoreError::Integrity("duplicate key".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            AppError::Internal { message, details } => {
                assert_eq!(message, "Database integrity error");
                assert!(details.unwrap().contains("duplicate key"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
