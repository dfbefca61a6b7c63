//! Cart and booking reducer.
//!
//! Commands mutate the in-memory cart and write it through to storage before
//! the reducer returns, so a reload immediately after a command observes it.
//! Remote work (catalog lookups, booking submission) runs as effects whose
//! results come back as events.

use crate::environment::{CartEnvironment, CatalogLookup};
use crate::totals::OrderTotals;
use crate::types::{
    field_errors, BookingProfile, Cart, CartError, CartLine, FieldErrors, ResolvedCartLine,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use shayna_api::{BookingItem, BookingRequest, Cosmetic, ProofOfPayment};
use shayna_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

/// Where the cart is in its page lifecycle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CartStatus {
    /// Not loaded yet
    #[default]
    Idle,
    /// Reconciliation pass in flight
    Loading,
    /// Every line resolved or dropped; totals are meaningful
    Ready,
    /// Booking submission in flight
    Submitting,
    /// Booking accepted by the server
    Submitted {
        /// Transaction id for the confirmation view
        booking_trx_id: String,
    },
}

/// User-visible feedback from the last action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A product was added
    Added {
        /// Product slug
        slug: String,
    },
    /// The product was already in the cart; nothing changed
    DuplicateCartEntry {
        /// Product slug
        slug: String,
    },
    /// The booking profile was stored
    ProfileSaved,
    /// Client-side checks blocked the action; see `field_errors`
    SubmissionValidationFailure,
    /// The booking call failed; the cart is untouched
    SubmissionTransportFailure {
        /// Error reported by the gateway
        message: String,
    },
    /// The booking was accepted
    BookingSubmitted {
        /// Transaction id
        booking_trx_id: String,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added { .. } => write!(f, "Item added to cart"),
            Self::DuplicateCartEntry { .. } => write!(f, "Item already in cart"),
            Self::ProfileSaved => write!(f, "Booking details saved"),
            Self::SubmissionValidationFailure => write!(f, "Please fix the highlighted fields"),
            Self::SubmissionTransportFailure { message } => {
                write!(f, "Error submitting booking: {message}")
            },
            Self::BookingSubmitted { booking_trx_id } => {
                write!(f, "Booking {booking_trx_id} submitted")
            },
        }
    }
}

/// State of the cart and booking flow
#[derive(Clone, Debug, Default)]
pub struct CartState {
    /// Lines in display order
    pub cart: Cart,
    /// Products fetched by the last reconciliation, keyed by product id
    pub products: HashMap<u64, Cosmetic>,
    /// Lifecycle status
    pub status: CartStatus,
    /// Buyer details carried from the booking page to the payment page
    pub profile: Option<BookingProfile>,
    /// Feedback from the last action
    pub notice: Option<Notice>,
    /// Field-level validation messages
    pub field_errors: FieldErrors,
    /// Last storage or transport error
    pub last_error: Option<String>,
    /// Counter identifying the current reconciliation pass
    pub pass: u64,
    /// When the last reconciliation completed
    pub reconciled_at: Option<DateTime<Utc>>,
}

impl CartState {
    /// Creates an empty, unloaded state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cart lines paired with their products, in display order
    ///
    /// Lines without a fetched product (added after the last pass) are
    /// skipped.
    #[must_use]
    pub fn resolved_lines(&self) -> Vec<ResolvedCartLine> {
        self.cart
            .lines()
            .iter()
            .filter_map(|line| {
                self.products.get(&line.product_id).map(|product| ResolvedCartLine {
                    line: line.clone(),
                    product: product.clone(),
                })
            })
            .collect()
    }

    /// Totals, once every line has live product data
    ///
    /// `None` while a pass is running and after a line was added that the
    /// last pass did not cover.
    #[must_use]
    pub fn totals(&self) -> Option<OrderTotals> {
        self.is_reconciled()
            .then(|| OrderTotals::from_lines(&self.resolved_lines()))
    }

    /// Whether every line has live product data and no pass is running
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.status == CartStatus::Ready
            && self
                .cart
                .lines()
                .iter()
                .all(|line| self.products.contains_key(&line.product_id))
    }
}

/// Actions for the cart reducer
#[derive(Clone, Debug)]
pub enum CartAction {
    // Commands
    /// Page entry: reload from storage and reconcile against the catalog
    LoadCart,
    /// Add a product with quantity one
    AddToCart {
        /// Catalog identifier
        product_id: u64,
        /// Lookup key
        slug: String,
    },
    /// Remove the line for `slug`
    RemoveFromCart {
        /// Lookup key
        slug: String,
    },
    /// Raise the quantity for `slug` by one, up to ten
    IncrementQuantity {
        /// Lookup key
        slug: String,
    },
    /// Lower the quantity for `slug` by one, down to one
    DecrementQuantity {
        /// Lookup key
        slug: String,
    },
    /// Clear the current notice
    DismissNotice,
    /// Validate and store the buyer details
    SaveBookingProfile {
        /// Entered details
        profile: BookingProfile,
    },
    /// Validate and submit the booking
    SubmitBooking {
        /// Proof-of-payment attachment
        proof: Option<ProofOfPayment>,
    },

    // Events
    /// A reconciliation pass finished
    CartReconciled {
        /// Pass the results belong to
        pass: u64,
        /// Lines whose product resolved, in input order
        resolved: Vec<ResolvedCartLine>,
        /// Lines whose lookup failed
        dropped: Vec<CartLine>,
    },
    /// The server accepted the booking
    BookingSubmitted {
        /// Transaction id
        booking_trx_id: String,
    },
    /// The booking call failed
    BookingFailed {
        /// Error description
        error: String,
    },
}

/// Reducer for the cart and booking flow
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn persist_cart(state: &mut CartState, env: &CartEnvironment) {
        if let Err(error) = env.persistence.save_cart(&state.cart) {
            tracing::error!(%error, "failed to persist cart");
            state.last_error = Some(error.to_string());
        }
    }

    fn validate_submission(state: &CartState, proof: Option<&ProofOfPayment>) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if state.status == CartStatus::Submitting {
            errors.insert("cart".to_string(), "A booking is already being submitted".to_string());
        } else if !state.is_reconciled() {
            errors.insert("cart".to_string(), "Cart is still loading".to_string());
        } else if state.cart.is_empty() {
            errors.insert("cart".to_string(), "Cart is empty".to_string());
        }

        match &state.profile {
            None => {
                errors.insert("profile".to_string(), "Booking details are required".to_string());
            },
            Some(profile) => {
                if let Err(invalid) = profile.validate() {
                    errors.extend(field_errors(&invalid));
                }
            },
        }

        if proof.is_none_or(ProofOfPayment::is_empty) {
            errors.insert("proof".to_string(), "Proof of payment is required".to_string());
        }

        errors
    }

    fn booking_request(
        state: &CartState,
        profile: &BookingProfile,
        proof: ProofOfPayment,
    ) -> BookingRequest {
        BookingRequest {
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            post_code: profile.post_code.clone(),
            city: profile.city.clone(),
            items: state
                .resolved_lines()
                .iter()
                .map(|resolved| BookingItem {
                    id: resolved.line.product_id,
                    quantity: resolved.line.quantity.get(),
                })
                .collect(),
            proof,
        }
    }
}

/// Resolve every line concurrently, keeping input order
///
/// A failed lookup drops its line; it never fails the pass.
pub async fn reconcile(
    catalog: Arc<dyn CatalogLookup>,
    lines: Vec<CartLine>,
    pass: u64,
) -> CartAction {
    let lookups: Vec<_> = lines.iter().map(|line| catalog.lookup(&line.slug)).collect();
    let results = join_all(lookups).await;

    let mut resolved = Vec::with_capacity(lines.len());
    let mut dropped = Vec::new();

    for (line, result) in lines.into_iter().zip(results) {
        match result {
            Ok(product) => resolved.push(ResolvedCartLine { line, product }),
            Err(error) => {
                tracing::warn!(slug = %line.slug, %error, "dropping cart line that no longer resolves");
                dropped.push(line);
            },
        }
    }

    CartAction::CartReconciled {
        pass,
        resolved,
        dropped,
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            CartAction::LoadCart => {
                state.cart = env.persistence.load_cart();
                state.profile = env.persistence.load_profile();
                state.pass += 1;
                state.field_errors.clear();

                if state.cart.is_empty() {
                    state.products.clear();
                    state.status = CartStatus::Ready;
                    state.reconciled_at = Some(env.clock.now());
                    return SmallVec::new();
                }

                state.status = CartStatus::Loading;
                tracing::debug!(lines = state.cart.len(), pass = state.pass, "reconciling cart");

                let catalog = Arc::clone(&env.catalog);
                let lines = state.cart.lines().to_vec();
                let pass = state.pass;
                smallvec![Effect::future(async move {
                    Some(reconcile(catalog, lines, pass).await)
                })]
            },

            CartAction::AddToCart { product_id, slug } => {
                match state.cart.insert(product_id, slug.clone()) {
                    Ok(()) => {
                        Self::persist_cart(state, env);
                        state.notice = Some(Notice::Added { slug });
                    },
                    Err(CartError::DuplicateProduct(_) | CartError::DuplicateSlug(_)) => {
                        tracing::debug!(product_id, %slug, "rejected duplicate add");
                        state.notice = Some(Notice::DuplicateCartEntry { slug });
                    },
                    Err(error @ CartError::QuantityOutOfRange(_)) => {
                        state.last_error = Some(error.to_string());
                    },
                }
                SmallVec::new()
            },

            CartAction::RemoveFromCart { slug } => {
                if state.cart.remove(&slug) {
                    Self::persist_cart(state, env);
                }
                SmallVec::new()
            },

            CartAction::IncrementQuantity { slug } => {
                if state.cart.increment(&slug) {
                    Self::persist_cart(state, env);
                }
                SmallVec::new()
            },

            CartAction::DecrementQuantity { slug } => {
                if state.cart.decrement(&slug) {
                    Self::persist_cart(state, env);
                }
                SmallVec::new()
            },

            CartAction::DismissNotice => {
                state.notice = None;
                SmallVec::new()
            },

            CartAction::SaveBookingProfile { profile } => {
                if let Err(invalid) = profile.validate() {
                    state.field_errors = field_errors(&invalid);
                    state.notice = Some(Notice::SubmissionValidationFailure);
                    return SmallVec::new();
                }

                state.field_errors.clear();
                match env.persistence.save_profile(&profile) {
                    Ok(()) => state.notice = Some(Notice::ProfileSaved),
                    Err(error) => {
                        tracing::error!(%error, "failed to persist booking profile");
                        state.last_error = Some(error.to_string());
                    },
                }
                state.profile = Some(profile);
                SmallVec::new()
            },

            CartAction::SubmitBooking { proof } => {
                let errors = Self::validate_submission(state, proof.as_ref());
                let (Some(proof), Some(profile), true) = (proof, state.profile.clone(), errors.is_empty())
                else {
                    tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "booking blocked");
                    state.field_errors = errors;
                    state.notice = Some(Notice::SubmissionValidationFailure);
                    return SmallVec::new();
                };

                state.field_errors.clear();
                state.status = CartStatus::Submitting;

                let request = Self::booking_request(state, &profile, proof);
                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::future(async move {
                    match gateway.submit(request).await {
                        Ok(receipt) => Some(CartAction::BookingSubmitted {
                            booking_trx_id: receipt.booking_trx_id,
                        }),
                        Err(error) => Some(CartAction::BookingFailed {
                            error: error.to_string(),
                        }),
                    }
                })]
            },

            // ========== Events ==========
            CartAction::CartReconciled {
                pass,
                resolved,
                dropped,
            } => {
                let removed = state.cart.remove_lines(&dropped);
                for item in resolved {
                    state.products.insert(item.line.product_id, item.product);
                }
                for line in &dropped {
                    state.products.remove(&line.product_id);
                }

                if removed > 0 {
                    Self::persist_cart(state, env);
                }

                if pass == state.pass && state.status == CartStatus::Loading {
                    state.status = CartStatus::Ready;
                    state.reconciled_at = Some(env.clock.now());
                    tracing::info!(
                        lines = state.cart.len(),
                        dropped = dropped.len(),
                        "cart reconciled"
                    );
                }
                SmallVec::new()
            },

            CartAction::BookingSubmitted { booking_trx_id } => {
                state.cart.clear();
                state.products.clear();
                state.profile = None;

                for result in [env.persistence.clear_cart(), env.persistence.clear_profile()] {
                    if let Err(error) = result {
                        tracing::error!(%error, "failed to clear submitted booking state");
                        state.last_error = Some(error.to_string());
                    }
                }

                tracing::info!(%booking_trx_id, "booking submitted");
                state.notice = Some(Notice::BookingSubmitted {
                    booking_trx_id: booking_trx_id.clone(),
                });
                state.status = CartStatus::Submitted { booking_trx_id };
                SmallVec::new()
            },

            CartAction::BookingFailed { error } => {
                tracing::warn!(%error, "booking submission failed");
                state.status = CartStatus::Ready;
                state.last_error = Some(error.clone());
                state.notice = Some(Notice::SubmissionTransportFailure { message: error });
                SmallVec::new()
            },
        }
    }
}
