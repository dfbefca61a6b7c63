//! Cart, booking and order lookup state for the Shayna cosmetics storefront.
//!
//! The storefront keeps a small cart in a client-side key/value slot,
//! re-validates it against the live catalog on every page entry, and hands
//! the reconciled lines to a one-shot booking submission.
//!
//! - [`reducer::CartReducer`]: add/remove/increment/decrement, reconciliation,
//!   booking profile and submission
//! - [`lookup::BookingLookupReducer`]: the "check booking" view
//! - [`persistence::CartPersistence`]: schema-checked slots on top of a
//!   [`storage::KeyValueStore`]
//! - [`totals`]: order totals and Rupiah formatting
//!
//! # Quick Start
//!
//! ```no_run
//! use shayna_core::environment::SystemClock;
//! use shayna_runtime::Store;
//! use shayna_storefront::mocks::{cosmetic, RecordingGateway, StaticCatalog};
//! use shayna_storefront::storage::MemoryStore;
//! use shayna_storefront::{CartAction, CartEnvironment, CartReducer, CartState};
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = StaticCatalog::new().with_product(cosmetic(1, "glow-serum", dec!(100000)));
//! let env = CartEnvironment::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(catalog),
//!     Arc::new(RecordingGateway::succeeding("SHAYNA1")),
//!     Arc::new(SystemClock),
//! );
//! let store = Store::new(CartState::new(), CartReducer::new(), env);
//!
//! store
//!     .send(CartAction::AddToCart { product_id: 1, slug: "glow-serum".to_string() })
//!     .await?;
//! store.send(CartAction::LoadCart).await?.wait().await;
//!
//! let totals = store.state(CartState::totals).await;
//! println!("{totals:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod environment;
pub mod lookup;
pub mod mocks;
pub mod persistence;
pub mod reducer;
pub mod storage;
pub mod totals;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigError, StorefrontConfig};
pub use environment::{
    BookingGateway, CartEnvironment, CatalogError, CatalogLookup, GatewayError, LookupEnvironment,
};
pub use lookup::{BookingLookupForm, BookingLookupReducer, LookupAction, LookupState, LookupStatus};
pub use persistence::CartPersistence;
pub use reducer::{CartAction, CartReducer, CartState, CartStatus, Notice};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use totals::{format_idr, OrderTotals, TAX_RATE};
pub use types::{BookingProfile, Cart, CartError, CartLine, Quantity, ResolvedCartLine};
