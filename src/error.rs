use actix_web::HttpResponse;
use thiserror::Error;

use crate::auth::AuthError;
use crate::storage::StorageError;

/// Unified error type for the entire application
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a new config error
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Auth(e) => match e {
                AuthError::IdentityIncomplete(_) => "identity_incomplete",
                AuthError::IdentityProvider(_) => "identity_provider",
                AuthError::MissingToken => "missing_token",
                AuthError::InvalidToken => "invalid_token",
                AuthError::TokenExpired => "token_expired",
                AuthError::TokenRevoked => "token_revoked",
                AuthError::SessionInvalid => "session_invalid",
                AuthError::ProfileIncomplete => "profile_incomplete",
                AuthError::Storage(_) => "storage",
                AuthError::Internal(_) => "internal",
            },
            AppError::Storage(_) => "storage",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::Auth(e) => e.status_code(),
            AppError::Storage(_) => 500,
            AppError::Config(_) => 500,
            AppError::Internal(_) => 500,
        }
    }

    /// Convert to JSON for API responses
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AppError::Auth(e) => {
                let mut body = serde_json::json!({
                    "error": e.error_label(),
                    "message": e.client_hint(),
                });
                if matches!(e, AuthError::ProfileIncomplete) {
                    body["action"] = serde_json::Value::String("COMPLETE_PROFILE".to_string());
                }
                body
            }
            _ => serde_json::json!({
                "error": "Internal server error",
                "message": "Something went wrong",
            }),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {}", err))
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.http_status_code())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(actix_web::ResponseError::status_code(self)).json(self.to_json())
    }
}
