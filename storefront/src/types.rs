//! Domain types for the cart and booking flow.
//!
//! The cart is a short, ordered list of product lines. Every constructor and
//! mutator here keeps two invariants: a quantity is always within
//! `Quantity::MIN..=Quantity::MAX`, and a product appears at most once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shayna_api::Cosmetic;
use std::collections::BTreeMap;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Quantity of one cart line, always within `1..=10`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quantity(u8);

impl Quantity {
    /// Smallest quantity a line can hold
    pub const MIN: u8 = 1;
    /// Largest quantity a line can hold
    pub const MAX: u8 = 10;

    /// Create a quantity, or `None` when out of range
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// A quantity of one
    #[must_use]
    pub const fn one() -> Self {
        Self(Self::MIN)
    }

    /// Returns the inner value
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The next quantity up, or `None` at the ceiling
    #[must_use]
    pub const fn incremented(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// The next quantity down, or `None` at the floor
    #[must_use]
    pub const fn decremented(self) -> Option<Self> {
        Self::new(self.0 - 1)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::one()
    }
}

impl TryFrom<u8> for Quantity {
    type Error = CartError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(CartError::QuantityOutOfRange(value))
    }
}

impl From<Quantity> for u8 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised when a cart invariant would be broken
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity outside `1..=10`
    #[error("Quantity {0} is outside 1..=10")]
    QuantityOutOfRange(u8),

    /// Product already has a line in the cart
    #[error("Item already in cart")]
    DuplicateProduct(u64),

    /// Slug already has a line in the cart
    #[error("Item already in cart")]
    DuplicateSlug(String),
}

/// One product + quantity entry in the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog identifier of the product
    #[serde(rename = "cosmetic_id")]
    pub product_id: u64,
    /// Lookup key used to resolve the product
    pub slug: String,
    /// Units ordered
    pub quantity: Quantity,
}

impl CartLine {
    /// A fresh line with a quantity of one
    #[must_use]
    pub fn new(product_id: u64, slug: impl Into<String>) -> Self {
        Self {
            product_id,
            slug: slug.into(),
            quantity: Quantity::one(),
        }
    }

    fn same_entry(&self, other: &Self) -> bool {
        self.product_id == other.product_id && self.slug == other.slug
    }
}

/// Ordered collection of cart lines (insertion order is display order)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in display order
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line for the given slug
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.slug == slug)
    }

    /// Whether the product already has a line
    #[must_use]
    pub fn contains_product(&self, product_id: u64) -> bool {
        self.lines.iter().any(|line| line.product_id == product_id)
    }

    /// Sum of all line quantities
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| u32::from(line.quantity.get()))
            .sum()
    }

    /// Append a new line with a quantity of one
    ///
    /// # Errors
    ///
    /// Returns `CartError::DuplicateProduct` or `CartError::DuplicateSlug`
    /// when the product is already in the cart; the cart is left unchanged.
    pub fn insert(&mut self, product_id: u64, slug: impl Into<String>) -> Result<(), CartError> {
        let line = CartLine::new(product_id, slug);
        self.check_unique(&line)?;
        self.lines.push(line);
        Ok(())
    }

    /// Remove the line for `slug`; returns whether anything changed
    pub fn remove(&mut self, slug: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.slug != slug);
        self.lines.len() != before
    }

    /// Raise the quantity for `slug` by one; returns whether anything changed
    pub fn increment(&mut self, slug: &str) -> bool {
        self.update_quantity(slug, Quantity::incremented)
    }

    /// Lower the quantity for `slug` by one; returns whether anything changed
    pub fn decrement(&mut self, slug: &str) -> bool {
        self.update_quantity(slug, Quantity::decremented)
    }

    /// Drop every line matching one of `dropped`; returns how many were removed
    pub fn remove_lines(&mut self, dropped: &[CartLine]) -> usize {
        let before = self.lines.len();
        self.lines
            .retain(|line| !dropped.iter().any(|gone| gone.same_entry(line)));
        before - self.lines.len()
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn update_quantity(&mut self, slug: &str, step: fn(Quantity) -> Option<Quantity>) -> bool {
        let Some(line) = self.lines.iter_mut().find(|line| line.slug == slug) else {
            return false;
        };

        match step(line.quantity) {
            Some(quantity) => {
                line.quantity = quantity;
                true
            },
            None => false,
        }
    }

    fn check_unique(&self, candidate: &CartLine) -> Result<(), CartError> {
        if self.contains_product(candidate.product_id) {
            return Err(CartError::DuplicateProduct(candidate.product_id));
        }
        if self.find(&candidate.slug).is_some() {
            return Err(CartError::DuplicateSlug(candidate.slug.clone()));
        }
        Ok(())
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut cart = Self::new();
        for line in lines {
            cart.check_unique(&line)?;
            cart.lines.push(line);
        }
        Ok(cart)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

/// A cart line paired with the product fetched during reconciliation
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCartLine {
    /// The cart line
    pub line: CartLine,
    /// Live product data
    pub product: Cosmetic,
}

impl ResolvedCartLine {
    /// `price × quantity` at full precision
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.line.quantity.get())
    }
}

/// Buyer details entered on the booking page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingProfile {
    /// Buyer name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Buyer email
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Buyer phone
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    /// Shipping address
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    /// Shipping post code
    #[validate(length(min = 1, message = "Postcode is required"))]
    pub post_code: String,
    /// Shipping city
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
}

/// Field name → first validation message
pub type FieldErrors = BTreeMap<String, String>;

/// Flatten `validator` output into one message per field
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errors)| {
            errors.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| format!("{field} is invalid"), ToString::to_string);
                (field.to_string(), message)
            })
        })
        .collect()
}
