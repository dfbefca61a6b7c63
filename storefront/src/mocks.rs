//! In-memory collaborators for tests and offline demos.

use crate::environment::{BookingGateway, BoxFuture, CatalogError, CatalogLookup, GatewayError};
use rust_decimal::Decimal;
use shayna_api::{
    BookingDetails, BookingReceipt, BookingRequest, Brand, CheckBookingRequest, Cosmetic,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A product fixture with the given id, slug and price
#[must_use]
pub fn cosmetic(id: u64, slug: &str, price: Decimal) -> Cosmetic {
    Cosmetic {
        id,
        name: slug.replace('-', " "),
        slug: slug.to_string(),
        description: String::new(),
        thumbnail: format!("thumbnails/{slug}.png"),
        price,
        is_popular: false,
        category: None,
        brand: Some(Brand {
            id: 1,
            name: "Shayna".to_string(),
            slug: "shayna".to_string(),
            photo: None,
        }),
        benefits: Vec::new(),
        photos: Vec::new(),
        testimonials: Vec::new(),
    }
}

/// Catalog backed by a mutable map
///
/// Clones share the same products and counters, so a test can change prices
/// or delete products between passes.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: Arc<Mutex<HashMap<String, Cosmetic>>>,
    unavailable: Arc<Mutex<HashSet<String>>>,
    lookups: Arc<AtomicUsize>,
}

impl StaticCatalog {
    /// An empty catalog; every lookup is not found
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`StaticCatalog::insert`]
    #[must_use]
    pub fn with_product(self, product: Cosmetic) -> Self {
        self.insert(product);
        self
    }

    /// Add or replace a product
    pub fn insert(&self, product: Cosmetic) {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.slug.clone(), product);
    }

    /// Delete a product so its lookups report not found
    pub fn remove(&self, slug: &str) {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(slug);
    }

    /// Make lookups for `slug` fail as a transport error
    pub fn fail_transport(&self, slug: &str) {
        self.unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slug.to_string());
    }

    /// Number of lookups served so far
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl CatalogLookup for StaticCatalog {
    fn lookup(&self, slug: &str) -> BoxFuture<Result<Cosmetic, CatalogError>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let unavailable = self
            .unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(slug);
        let result = if unavailable {
            Err(CatalogError::Unavailable(format!("connection reset for {slug}")))
        } else {
            self.products
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(slug)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("cosmetic {slug}")))
        };

        Box::pin(async move { result })
    }
}

/// Gateway that records every call and answers with a fixed outcome
#[derive(Clone, Debug)]
pub struct RecordingGateway {
    outcome: Result<String, GatewayError>,
    submissions: Arc<Mutex<Vec<BookingRequest>>>,
    bookings: Arc<Mutex<HashMap<(String, String), BookingDetails>>>,
}

impl RecordingGateway {
    /// Accept every submission with the given transaction id
    #[must_use]
    pub fn succeeding(booking_trx_id: &str) -> Self {
        Self::with_outcome(Ok(booking_trx_id.to_string()))
    }

    /// Fail every submission with `error`
    #[must_use]
    pub fn failing(error: GatewayError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, GatewayError>) -> Self {
        Self {
            outcome,
            submissions: Arc::default(),
            bookings: Arc::default(),
        }
    }

    /// Make a booking discoverable through `check`
    #[must_use]
    pub fn with_booking(self, details: BookingDetails) -> Self {
        self.bookings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (details.booking_trx_id.clone(), details.email.clone()),
                details,
            );
        self
    }

    /// Every request submitted so far
    #[must_use]
    pub fn submissions(&self) -> Vec<BookingRequest> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BookingGateway for RecordingGateway {
    fn submit(&self, request: BookingRequest) -> BoxFuture<Result<BookingReceipt, GatewayError>> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let outcome = self
            .outcome
            .clone()
            .map(|booking_trx_id| BookingReceipt { booking_trx_id });
        Box::pin(async move { outcome })
    }

    fn check(
        &self,
        request: CheckBookingRequest,
    ) -> BoxFuture<Result<BookingDetails, GatewayError>> {
        let found = self
            .bookings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(request.booking_trx_id, request.email))
            .cloned()
            .ok_or(GatewayError::NotFound);
        Box::pin(async move { found })
    }
}
