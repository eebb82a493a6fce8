//! Commerce error types.

use shop_data::FetchError;
use thiserror::Error;

/// Fallback message when the backend rejects a request without explaining why.
pub const GENERIC_BACKEND_MESSAGE: &str = "Request failed.";

/// Errors that can occur in cart, checkout and payment operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Required shipping fields are empty. Raised before any network call.
    #[error("Missing required shipping fields: {}", .0.join(", "))]
    InvalidAddress(Vec<&'static str>),

    /// The backend answered with a business error.
    #[error("{message}")]
    BackendRejection {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The backend could not be reached.
    #[error("Network error, please try again: {0}")]
    Transport(String),

    /// A payment redirect is missing or has a malformed parameter.
    #[error("Malformed payment callback: {0}")]
    MalformedCallback(String),

    /// The callback amount differs from the amount recorded at order creation.
    #[error("Payment amount mismatch: expected {expected}, received {received}")]
    AmountMismatch { expected: i64, received: i64 },

    /// A checkout submission is already in flight.
    #[error("Checkout already in progress")]
    CheckoutInProgress,

    /// Nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// The operation needs a signed-in user.
    #[error("Sign in required")]
    NotAuthenticated,

    /// The backend acknowledged the order without an identifier.
    #[error("Order was created without an order id")]
    MissingOrderId,

    /// The payment widget refused to start.
    #[error("{message}")]
    Widget {
        code: Option<String>,
        message: String,
    },

    /// Client storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CommerceError {
    /// True for errors raised locally, before any backend call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommerceError::InvalidAddress(_)
                | CommerceError::EmptyCart
                | CommerceError::MalformedCallback(_)
                | CommerceError::AmountMismatch { .. }
        )
    }
}

impl From<FetchError> for CommerceError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Http {
                status,
                code,
                message,
            } => CommerceError::BackendRejection {
                status,
                code,
                message: message.unwrap_or_else(|| GENERIC_BACKEND_MESSAGE.to_string()),
            },
            FetchError::Parse(msg) | FetchError::Json(msg) => CommerceError::Serialization(msg),
            other => CommerceError::Transport(other.to_string()),
        }
    }
}

impl From<shop_cache::CacheError> for CommerceError {
    fn from(e: shop_cache::CacheError) -> Self {
        CommerceError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}
