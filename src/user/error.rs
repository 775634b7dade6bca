//! User-related error types

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

/// User-specific errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("No user found with that ID")]
    UserNotFound,

    #[error("This route is not for password updates. Please use /updateMyPassword.")]
    PasswordUpdateNotAllowed,

    #[error("Not an image! Please upload only images.")]
    NotAnImage,

    #[error("Uploaded file exceeds the {0} byte limit")]
    FileTooLarge(usize),

    #[error("Invalid input data. {0}")]
    ValidationError(String),

    #[error("Duplicate field value: {0}")]
    DuplicateField(String),

    #[error("You are not logged in: {0}")]
    Unauthorized(String),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("File system error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::UserNotFound => StatusCode::NOT_FOUND,
            UserError::PasswordUpdateNotAllowed => StatusCode::BAD_REQUEST,
            UserError::NotAnImage => StatusCode::BAD_REQUEST,
            UserError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            UserError::ValidationError(_) => StatusCode::BAD_REQUEST,
            UserError::DuplicateField(_) => StatusCode::CONFLICT,
            UserError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            UserError::Forbidden => StatusCode::FORBIDDEN,
            UserError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::ImageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `fail` for client errors, `error` for everything the server got wrong
    pub fn status_label(&self) -> &'static str {
        if self.status_code().is_client_error() {
            "fail"
        } else {
            "error"
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status_label().to_string(),
            message: self.to_string(),
        }
    }
}

impl ResponseError for UserError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{self}");
        }
        HttpResponse::build(self.status_code()).json(self.to_response())
    }
}

impl From<tokio_postgres::Error> for UserError {
    fn from(error: tokio_postgres::Error) -> Self {
        if let Some(db_error) = error.as_db_error() {
            if *db_error.code() == tokio_postgres::error::SqlState::UNIQUE_VIOLATION {
                let field = db_error
                    .constraint()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| db_error.message().to_string());
                return UserError::DuplicateField(field);
            }
        }
        UserError::DatabaseError(error.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for UserError {
    fn from(error: deadpool_postgres::PoolError) -> Self {
        UserError::DatabaseError(format!("Failed to get database connection: {error}"))
    }
}

impl From<image::ImageError> for UserError {
    fn from(error: image::ImageError) -> Self {
        UserError::ImageError(error.to_string())
    }
}

impl From<std::io::Error> for UserError {
    fn from(error: std::io::Error) -> Self {
        UserError::IoError(error.to_string())
    }
}

impl From<actix_web::error::BlockingError> for UserError {
    fn from(error: actix_web::error::BlockingError) -> Self {
        UserError::InternalError(error.to_string())
    }
}

impl From<actix_multipart::MultipartError> for UserError {
    fn from(error: actix_multipart::MultipartError) -> Self {
        UserError::ValidationError(format!("Malformed multipart body: {error}"))
    }
}

impl From<serde_json::Error> for UserError {
    fn from(error: serde_json::Error) -> Self {
        UserError::ValidationError(error.to_string())
    }
}
