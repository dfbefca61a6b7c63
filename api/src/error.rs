//! Error types for the storefront API client

use thiserror::Error;

/// Errors that can occur when talking to the storefront API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// HTTP request could not be sent or completed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the submitted fields
    #[error("Rejected by server: {0}")]
    Validation(String),

    /// API returned an unexpected status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
}

impl ApiError {
    /// Whether the error means the resource is gone rather than unreachable
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
