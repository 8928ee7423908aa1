// src/store.rs
// Key-value storage abstraction for the bot blocker.
// All durable state (settings, block events) goes through this trait so that
// tests can run against an in-memory map and the request path can degrade
// gracefully when the backing store is unreachable.

use spin_sdk::key_value::Store;
use std::fmt;

/// Failure classes surfaced by storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No backing store connection at all.
    Unavailable,
    /// The store exists but an individual operation failed.
    Backend(String),
    /// A stored value could not be encoded/decoded.
    Serialize(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "key-value store unavailable"),
            StoreError::Backend(msg) => write!(f, "key-value operation failed: {}", msg),
            StoreError::Serialize(msg) => write!(f, "value serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    fn get_keys(&self) -> Result<Vec<String>, StoreError>;
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Store::get(self, key).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        Store::set(self, key, value).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        Store::delete(self, key).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn get_keys(&self) -> Result<Vec<String>, StoreError> {
        Store::get_keys(self).map_err(|e| StoreError::Backend(e.to_string()))
    }
}
