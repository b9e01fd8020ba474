//! Persistent key-value storage backing the search history.
//!
//! The history service never touches a concrete backend directly. It talks to
//! a [`KeyValueStore`]: string keys, string values, asynchronous
//! get/set/remove. Two backends ship with the crate:
//!
//! - [`MemoryStore`]: an in-process map, used by tests and embedders that
//!   bring their own persistence
//! - [`FileStore`]: one JSON file per key under a directory, rewritten
//!   through a temporary file and an atomic rename
//!
//! # Example
//!
//! ```ignore
//! use search_history::storage::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set_item("@search_history_k510", "[]").await?;
//! assert_eq!(store.get_item("@search_history_k510").await?, Some("[]".to_string()));
//! ```

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend refused or could not service the request (quota, lock
    /// poisoning, closed handle).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed, string-valued asynchronous storage.
///
/// Writes to a single key must be atomic: a read sees either the previous
/// value or a complete new one, and overlapping writers leave exactly one
/// of their values. The history service performs no locking of its own.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn remove_item(&self, key: &str) -> StoreResult<()>;
}

#[async_trait]
impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key).await
    }
}

#[async_trait]
impl<S> KeyValueStore for Box<S>
where
    S: KeyValueStore + ?Sized,
{
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key).await
    }
}
