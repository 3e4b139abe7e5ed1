//! Key-value store trait.
//!
//! Defines the interface for the local store that mirrors conversation state.

use crate::error::Result;
use async_trait::async_trait;

/// An abstract string key-value store.
///
/// This trait decouples the conversation logic from the storage mechanism
/// (JSON files on disk, memory, a browser-style local storage bridge).
///
/// # Implementation Notes
///
/// - `set` must have completed durably when it returns.
/// - `remove` on a missing key is not an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: Value found
    /// - `Ok(None)`: Nothing stored under `key`
    /// - `Err(_)`: Error occurred during retrieval
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes the value stored under `key`.
    async fn remove(&self, key: &str) -> Result<()>;
}
