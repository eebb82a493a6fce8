//! Authentication errors.

use shop_data::FetchError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Local form validation failed. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// The token is not a decodable JWT.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token's `exp` has passed.
    #[error("session expired")]
    TokenExpired,

    /// No user is signed in.
    #[error("not signed in")]
    NotAuthenticated,

    /// The backend rejected the request (wrong password, duplicate email, bad admin code).
    #[error("{message}")]
    Backend {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Transport(String),

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken(_)
                | AuthError::TokenExpired
                | AuthError::NotAuthenticated
                | AuthError::Backend { status: 401, .. }
        )
    }
}

impl From<FetchError> for AuthError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Http {
                status,
                code,
                message,
            } => AuthError::Backend {
                status,
                code,
                message: message.unwrap_or_else(|| "Request failed.".to_string()),
            },
            FetchError::Parse(msg) | FetchError::Json(msg) => AuthError::Serialization(msg),
            other => AuthError::Transport(other.to_string()),
        }
    }
}

impl From<shop_cache::CacheError> for AuthError {
    fn from(e: shop_cache::CacheError) -> Self {
        AuthError::Cache(e.to_string())
    }
}
