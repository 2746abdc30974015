//! Key-value persistence for the portal.
//!
//! Every manager mirrors its whole collection into a [`KeyValueStore`] after each
//! mutation. Values are JSON strings; a `set` always replaces the previous value,
//! so the last writer wins. The portal assumes a single writer.
//!
//! Two implementations are provided:
//! - [`MemoryStore`]: in-process map, used by tests and throwaway sessions
//! - [`FileStore`]: one JSON document on disk holding every key

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// Storage keys, matching the layout used by earlier portal releases.
pub mod keys {
    pub const APPLICATIONS: &str = "applications";
    pub const USERS: &str = "users";
    pub const ADMINS: &str = "admins";
    pub const ACTION_LOG: &str = "actionLog";
    pub const RESOURCES: &str = "resources";
    pub const ADMIN_PASSWORD: &str = "adminPassword";
    pub const CURRENT_USER: &str = "currentUser";
    pub const THEME_PREFERENCE: &str = "user-theme-preference";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String-to-string store with whole-value overwrite semantics.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Store handle shared by every manager.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read a JSON value stored under `key`, or `None` if the key is absent.
pub fn load_value<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize `value` and overwrite `key` with it.
pub fn save_value<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Read a collection, treating an absent key as empty.
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StoreError> {
    Ok(load_value(store, key)?.unwrap_or_default())
}

/// Overwrite `key` with the full collection.
pub fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StoreError> {
    save_value(store, key, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_collection_is_empty() {
        let store = MemoryStore::new();
        let items: Vec<u64> = load_collection(&store, keys::USERS).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_collection_overwrite() {
        let store = MemoryStore::new();
        save_collection(&store, keys::ADMINS, &["admin", "ops"]).unwrap();
        save_collection(&store, keys::ADMINS, &["admin"]).unwrap();

        assert_eq!(store.get(keys::ADMINS).unwrap().as_deref(), Some(r#"["admin"]"#));
    }

    #[test]
    fn test_corrupt_value_is_a_serialization_error() {
        let store = MemoryStore::new();
        store.set(keys::USERS, "{not json").unwrap();

        let result: Result<Vec<u64>, _> = load_collection(&store, keys::USERS);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_mocked_failure_propagates() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get()
            .returning(|_| Err(StoreError::Unavailable("quota".to_string())));

        let result: Result<Vec<u64>, _> = load_collection(&mock, keys::RESOURCES);
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
