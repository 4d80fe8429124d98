use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

use crate::utils::validation::{EmployeeForm, FieldErrors};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Validation { errors: FieldErrors, form: Box<EmployeeForm> },
    PayloadTooLarge(String),
    DatabaseError(String),
    StorageError(String),
    InternalServerError(String),
    Config(String),
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct ValidationResponse<'a> {
    error: &'a str,
    fields: &'a FieldErrors,
    form: &'a EmployeeForm,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Validation { errors, .. } => {
                write!(f, "Validation failed on {} field(s)", errors.len())
            }
            AppError::PayloadTooLarge(msg) => write!(f, "Payload Too Large: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::DatabaseError(_)
            | AppError::StorageError(_)
            | AppError::InternalServerError(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::Validation { errors, form } => builder.json(ValidationResponse {
                error: "Validation failed",
                fields: errors,
                form,
            }),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg) => builder.json(ErrorResponse { error: msg }),
            // Server-side failures are logged where they happen; the body stays generic.
            AppError::DatabaseError(_) => builder.json(ErrorResponse { error: "Database error" }),
            AppError::StorageError(_) => builder.json(ErrorResponse { error: "Storage error" }),
            AppError::InternalServerError(_) | AppError::Config(_) => {
                builder.json(ErrorResponse { error: "Internal server error" })
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("Database error: {:?}", err);
        AppError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        log::error!("Storage error: {:?}", err);
        AppError::StorageError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::DatabaseError(format!("Migration failed: {}", err))
    }
}
