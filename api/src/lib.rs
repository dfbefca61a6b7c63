//! # Shayna API Client
//!
//! Rust client library for the cosmetics storefront REST API: product
//! lookup, category browsing, booking submission and booking lookup.
//!
//! ## Example
//!
//! ```no_run
//! use shayna_api::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("https://api.shayna.test/api");
//!
//!     let cosmetic = client.cosmetic("glow-serum").await?;
//!     println!("{} costs {}", cosmetic.name, cosmetic.price);
//!     Ok(())
//! }
//! ```
//!
//! Every JSON response is wrapped in a `{ "data": ... }` envelope; the
//! client unwraps it and maps a missing payload to [`ApiError::NotFound`].

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    Benefit, BookingDetails, BookingItem, BookingReceipt, BookingRequest, Brand, Category,
    CheckBookingRequest, Cosmetic, Photo, ProofOfPayment, Testimonial, TransactionDetail,
};
