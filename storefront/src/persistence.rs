//! Persistence adapter for the cart and booking profile slots.
//!
//! Loading never fails: a missing, unreadable or malformed slot is recovered
//! as an empty cart or an absent profile and logged.

use crate::storage::{KeyValueStore, StorageError};
use crate::types::{BookingProfile, Cart};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Slot holding the serialized cart
pub const CART_KEY: &str = "cart";

/// Slot holding the serialized booking profile
pub const PROFILE_KEY: &str = "bookingProfile";

/// Reads and writes cart state through a [`KeyValueStore`]
#[derive(Clone)]
pub struct CartPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl CartPersistence {
    /// Wrap a key/value backend
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted cart, recovering bad data as an empty cart
    #[must_use]
    pub fn load_cart(&self) -> Cart {
        self.load(CART_KEY).unwrap_or_default()
    }

    /// Replace the persisted cart
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be encoded or written
    pub fn save_cart(&self, cart: &Cart) -> Result<(), StorageError> {
        self.save(CART_KEY, cart)
    }

    /// Delete the persisted cart
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be removed
    pub fn clear_cart(&self) -> Result<(), StorageError> {
        self.store.remove(CART_KEY)
    }

    /// Load the persisted booking profile, if any
    #[must_use]
    pub fn load_profile(&self) -> Option<BookingProfile> {
        self.load(PROFILE_KEY)
    }

    /// Replace the persisted booking profile
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be encoded or written
    pub fn save_profile(&self, profile: &BookingProfile) -> Result<(), StorageError> {
        self.save(PROFILE_KEY, profile)
    }

    /// Delete the persisted booking profile
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be removed
    pub fn clear_profile(&self) -> Result<(), StorageError> {
        self.store.remove(PROFILE_KEY)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(key, %error, "could not read persisted slot, starting empty");
                return None;
            },
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "persisted slot does not match schema, starting empty");
                None
            },
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|e| StorageError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &encoded)
    }
}

impl std::fmt::Debug for CartPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPersistence").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_save_then_load_cart() {
        let persistence = CartPersistence::new(Arc::new(MemoryStore::new()));
        let mut cart = Cart::new();
        cart.insert(1, "a").unwrap();
        cart.increment("a");

        persistence.save_cart(&cart).unwrap();
        assert_eq!(persistence.load_cart(), cart);
    }

    #[test]
    fn test_malformed_cart_is_empty() {
        for raw in ["not json", r#"{"cosmetic_id":1}"#, r#"[{"slug":"a"}]"#, "null"] {
            let persistence =
                CartPersistence::new(Arc::new(MemoryStore::with_slot(CART_KEY, raw)));
            assert!(persistence.load_cart().is_empty(), "input: {raw}");
        }
    }

    #[test]
    fn test_profile_slot_lifecycle() {
        let persistence = CartPersistence::new(Arc::new(MemoryStore::new()));
        assert!(persistence.load_profile().is_none());

        let profile = BookingProfile {
            name: "Sari".to_string(),
            email: "sari@example.com".to_string(),
            phone: "0812".to_string(),
            address: "Jl. Melati 1".to_string(),
            post_code: "40115".to_string(),
            city: "Bandung".to_string(),
        };
        persistence.save_profile(&profile).unwrap();
        assert_eq!(persistence.load_profile(), Some(profile));

        persistence.clear_profile().unwrap();
        assert!(persistence.load_profile().is_none());
    }

    #[test]
    fn test_profile_with_wrong_shape_is_absent() {
        let store = MemoryStore::with_slot(PROFILE_KEY, r#"{"name": 5}"#);
        let persistence = CartPersistence::new(Arc::new(store));
        assert!(persistence.load_profile().is_none());
    }
}
