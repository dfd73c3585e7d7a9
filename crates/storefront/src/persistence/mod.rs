//! Client-side storage for catalog, cart and view-state snapshots.
//!
//! Two scopes mirror browser storage:
//!
//! | scope   | backend            | keys                                    |
//! |---------|--------------------|-----------------------------------------|
//! | durable | [`FileStorage`]    | `products` (legacy `allProducts`), `cart` |
//! | session | [`MemoryStorage`]  | `selectedCategories`, `sortOption`      |
//!
//! Stored values are JSON text. The in-memory store is authoritative; these
//! are write-through copies read back only at startup.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Durable: full catalog snapshot (JSON array of products).
    pub const PRODUCTS: &str = "products";

    /// Durable: older name for the catalog snapshot, read when `products` is absent.
    pub const LEGACY_PRODUCTS: &str = "allProducts";

    /// Durable: cart lines (JSON array of cart items).
    pub const CART: &str = "cart";

    /// Session: selected categories (JSON array of strings).
    pub const SELECTED_CATEGORIES: &str = "selectedCategories";

    /// Session: active sort option (raw string; a quoted value is also accepted).
    pub const SORT_OPTION: &str = "sortOption";
}

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value is not valid JSON for the expected type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key cannot be mapped onto the backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key-value store.
pub trait Storage: Send + Sync {
    /// Read a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a raw value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON helpers over any [`Storage`].
pub trait StorageExt: Storage {
    /// Read and decode a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the value does not decode.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.get(key)?
            .map(|raw| serde_json::from_str(&raw).map_err(StorageError::from))
            .transpose()
    }

    /// Encode and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_helpers() {
        let mut storage = MemoryStorage::new();
        storage.set_json(keys::SELECTED_CATEGORIES, &["a", "b"]).unwrap();

        let raw = storage.get(keys::SELECTED_CATEGORIES).unwrap().unwrap();
        assert_eq!(raw, r#"["a","b"]"#);

        let decoded: Option<Vec<String>> = storage.get_json(keys::SELECTED_CATEGORIES).unwrap();
        assert_eq!(decoded, Some(vec!["a".to_string(), "b".to_string()]));

        let missing: Option<Vec<String>> = storage.get_json("nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_get_json_reports_corruption() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::CART, "{not json").unwrap();
        let result: Result<Option<Vec<String>>, _> = storage.get_json(keys::CART);
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn test_helpers_work_through_trait_objects() {
        let mut storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        storage.set_json(keys::SORT_OPTION, "price-high").unwrap();
        let value: Option<String> = storage.get_json(keys::SORT_OPTION).unwrap();
        assert_eq!(value.as_deref(), Some("price-high"));
    }
}
