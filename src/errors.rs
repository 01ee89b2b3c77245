use std::collections::HashMap;
use std::fmt;

use actix_web::{HttpResponse, ResponseError};

use crate::models::revision::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Session(String),
    PermissionDenied(String),
    BadRequest(String),
    /// Field-keyed validation messages, surfaced as `{"errors": {...}}` so
    /// the caller can attach each message to the originating field.
    Validation(HashMap<String, Vec<String>>),
    Hash(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::PermissionDenied(action) => write!(f, "Permission denied: {action}"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
            AppError::Validation(errors) => write!(f, "Validation failed ({} fields)", errors.len()),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => {
                HttpResponse::NotFound().json(serde_json::json!({ "error": "not found" }))
            }
            AppError::Session(_) => HttpResponse::Unauthorized()
                .json(serde_json::json!({ "error": "authentication required" })),
            AppError::PermissionDenied(_) => {
                HttpResponse::Forbidden().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::BadRequest(msg) => {
                HttpResponse::BadRequest().json(serde_json::json!({ "error": msg }))
            }
            AppError::Validation(errors) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({ "errors": errors }))
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "internal server error" }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e.0)
    }
}

/// Shorthand for a single-field validation error, e.g. a duplicate name.
pub fn field_error(field: &str, message: &str) -> AppError {
    let mut errors = HashMap::new();
    errors.insert(field.to_string(), vec![message.to_string()]);
    AppError::Validation(errors)
}
