use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Every failure a request or the startup sequence can hit.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Failures bubbled up from the `anyhow`-based storage internals.
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Record encoding error: {0}")]
    Encoding(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Seed(#[from] serde_yaml::Error),
}

impl AppError {
    /// HTTP status and the machine-readable `type` of the error body.
    fn describe(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, "authorization_error"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            AppError::Encoding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "encoding_error"),
            AppError::Token(_) => (StatusCode::INTERNAL_SERVER_ERROR, "token_error"),
            AppError::PasswordHash(_) => (StatusCode::INTERNAL_SERVER_ERROR, "password_hash_error"),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            AppError::Seed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "seed_error"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.describe().0
    }

    pub fn error_type(&self) -> &'static str {
        self.describe().1
    }

    /// Server faults and conflicts are logged at error level.
    pub fn should_log(&self) -> bool {
        self.status_code().is_server_error() || matches!(self, AppError::Conflict(_))
    }

    pub fn authentication(msg: impl Display) -> Self {
        Self::Authentication(msg.to_string())
    }

    pub fn authorization(msg: impl Display) -> Self {
        Self::Authorization(msg.to_string())
    }

    pub fn validation(msg: impl Display) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn not_found(msg: impl Display) -> Self {
        Self::NotFound(msg.to_string())
    }

    pub fn conflict(msg: impl Display) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn bad_request(msg: impl Display) -> Self {
        Self::BadRequest(msg.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.describe();

        if self.should_log() {
            tracing::error!("AppError: {} (status: {})", self, status);
        } else {
            tracing::debug!("AppError: {} (status: {})", self, status);
        }

        let body = json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
                "status": status.as_u16()
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<rmp_serde::encode::Error> for AppError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for AppError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
