pub mod authority;
pub mod linkedin;
pub mod token;

use crate::storage::StorageError;

/// Authentication error taxonomy. Every 401 cause gets its own variant so
/// logs can tell them apart even though clients see the same status.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Identity incomplete: {0}")]
    IdentityIncomplete(String),

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("No active session for token")]
    SessionInvalid,

    #[error("Profile incomplete")]
    ProfileIncomplete,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status the variant maps to
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::IdentityIncomplete(_) => 400,
            AuthError::IdentityProvider(_) => 502,
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::SessionInvalid => 401,
            AuthError::ProfileIncomplete => 403,
            AuthError::Storage(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Short machine-readable label for response bodies
    pub fn error_label(&self) -> &'static str {
        match self {
            AuthError::IdentityIncomplete(_) => "Email not provided",
            AuthError::IdentityProvider(_) => "Identity provider error",
            AuthError::MissingToken => "Access token required",
            AuthError::InvalidToken => "Invalid token",
            AuthError::TokenExpired => "Token expired",
            AuthError::TokenRevoked => "Token has been revoked",
            AuthError::SessionInvalid => "Invalid or expired session",
            AuthError::ProfileIncomplete => "Profile incomplete",
            AuthError::Storage(_) | AuthError::Internal(_) => "Internal server error",
        }
    }

    /// Human hint accompanying the label
    pub fn client_hint(&self) -> &'static str {
        match self {
            AuthError::IdentityIncomplete(_) => {
                "LinkedIn did not release an email address for this account"
            }
            AuthError::IdentityProvider(_) => "Could not complete sign-in with LinkedIn",
            AuthError::MissingToken => "Please provide a valid authentication token",
            AuthError::InvalidToken => "Authentication token is malformed",
            AuthError::TokenExpired | AuthError::TokenRevoked | AuthError::SessionInvalid => {
                "Please log in again"
            }
            AuthError::ProfileIncomplete => "Please complete your dating profile to continue",
            AuthError::Storage(_) | AuthError::Internal(_) => "Something went wrong",
        }
    }
}

/// Authentication result type
pub type Result<T> = std::result::Result<T, AuthError>;
