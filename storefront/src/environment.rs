//! Injected dependencies of the storefront reducers.
//!
//! Remote collaborators are traits returning boxed futures so that the
//! reducers can hold them as `Arc<dyn …>` and move them into effects.

use crate::persistence::CartPersistence;
use crate::storage::KeyValueStore;
use shayna_api::{
    ApiClient, ApiError, BookingDetails, BookingReceipt, BookingRequest, CheckBookingRequest,
    Cosmetic,
};
use shayna_core::environment::Clock;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Boxed future returned by remote collaborators
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Why a product could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The product no longer exists
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The catalog could not be reached or answered garbage
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<ApiError> for CatalogError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound(what) => Self::NotFound(what),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Why a booking call failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The server refused the submitted fields
    #[error("Booking rejected: {0}")]
    Rejected(String),

    /// No booking matches the lookup
    #[error("Booking not found")]
    NotFound,

    /// Network or server failure
    #[error("Booking service unavailable: {0}")]
    Transport(String),
}

impl From<ApiError> for GatewayError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Validation(body) => Self::Rejected(body),
            ApiError::NotFound(_) => Self::NotFound,
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Resolves a slug to the live product
pub trait CatalogLookup: Send + Sync {
    /// Fetch the current product for `slug`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` when the product is gone and
    /// `CatalogError::Unavailable` on transport failures
    fn lookup(&self, slug: &str) -> BoxFuture<Result<Cosmetic, CatalogError>>;
}

/// Remote booking endpoints
pub trait BookingGateway: Send + Sync {
    /// Submit a booking with its proof of payment
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the server rejects or cannot take the booking
    fn submit(&self, request: BookingRequest) -> BoxFuture<Result<BookingReceipt, GatewayError>>;

    /// Find a booking by transaction id and email
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` when nothing matches
    fn check(
        &self,
        request: CheckBookingRequest,
    ) -> BoxFuture<Result<BookingDetails, GatewayError>>;
}

impl CatalogLookup for ApiClient {
    fn lookup(&self, slug: &str) -> BoxFuture<Result<Cosmetic, CatalogError>> {
        let client = self.clone();
        let slug = slug.to_string();
        Box::pin(async move { client.cosmetic(&slug).await.map_err(CatalogError::from) })
    }
}

impl BookingGateway for ApiClient {
    fn submit(&self, request: BookingRequest) -> BoxFuture<Result<BookingReceipt, GatewayError>> {
        let client = self.clone();
        Box::pin(async move {
            client
                .submit_booking(&request)
                .await
                .map_err(GatewayError::from)
        })
    }

    fn check(
        &self,
        request: CheckBookingRequest,
    ) -> BoxFuture<Result<BookingDetails, GatewayError>> {
        let client = self.clone();
        Box::pin(async move {
            client
                .check_booking(&request)
                .await
                .map_err(GatewayError::from)
        })
    }
}

/// Environment for [`crate::reducer::CartReducer`]
#[derive(Clone)]
pub struct CartEnvironment {
    /// Cart and profile slots
    pub persistence: CartPersistence,
    /// Live product lookups
    pub catalog: Arc<dyn CatalogLookup>,
    /// Booking submission
    pub gateway: Arc<dyn BookingGateway>,
    /// Time source for reconciliation stamps
    pub clock: Arc<dyn Clock>,
}

impl CartEnvironment {
    /// Assemble an environment
    #[must_use]
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        catalog: Arc<dyn CatalogLookup>,
        gateway: Arc<dyn BookingGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            persistence: CartPersistence::new(storage),
            catalog,
            gateway,
            clock,
        }
    }
}

/// Environment for [`crate::lookup::BookingLookupReducer`]
#[derive(Clone)]
pub struct LookupEnvironment {
    /// Booking lookup endpoint
    pub gateway: Arc<dyn BookingGateway>,
}

impl LookupEnvironment {
    /// Assemble an environment
    #[must_use]
    pub fn new(gateway: Arc<dyn BookingGateway>) -> Self {
        Self { gateway }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_map_to_domain_errors() {
        assert_eq!(
            CatalogError::from(ApiError::NotFound("cosmetic a".to_string())),
            CatalogError::NotFound("cosmetic a".to_string())
        );
        assert!(matches!(
            CatalogError::from(ApiError::RequestFailed("refused".to_string())),
            CatalogError::Unavailable(_)
        ));
        assert_eq!(
            GatewayError::from(ApiError::Validation("bad email".to_string())),
            GatewayError::Rejected("bad email".to_string())
        );
        assert!(matches!(
            GatewayError::from(ApiError::ApiError {
                status: 502,
                message: String::new()
            }),
            GatewayError::Transport(_)
        ));
    }
}
