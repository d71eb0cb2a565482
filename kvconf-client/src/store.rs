//! Store abstraction
//!
//! The trait both the config service and the feeder are written against.
//! Implementations must be safe for concurrent use: a single instance is
//! shared across all in-flight requests.

use async_trait::async_trait;

use crate::error::Result;

/// Typed get/set access to a key-value store
///
/// Writes are unconditional overwrites (last write wins) and there are no
/// multi-key transactions: a reader may observe some keys from an older
/// write and some from a newer one.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Establishes the connection eagerly
    ///
    /// Fails with [`StoreError::Connection`](crate::StoreError::Connection)
    /// if the store cannot be reached within the connect timeout. Never
    /// retries; retry policy belongs to the caller.
    async fn connect(&self) -> Result<()>;

    /// Returns the stored value, or `NotFound` if the key was never set
    async fn get(&self, key: &str) -> Result<String>;

    /// Overwrites the value unconditionally
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Round-trip liveness probe
    async fn ping(&self) -> Result<()>;

    /// Human readable location of the store, used in logs and diagnostics
    fn address(&self) -> String;
}
