//! In-memory store
//!
//! A process-local implementation of [`KvStore`] with failure injection,
//! used by tests and for running the service without a store server.
//!
//! # Example
//! ```
//! use kvconf_client::{KvStore, MemoryStore};
//!
//! # async fn example() -> kvconf_client::Result<()> {
//! let store = MemoryStore::new();
//! store.set("first-name", "Beyond").await?;
//! assert_eq!(store.get("first-name").await?, "Beyond");
//!
//! // Every call now fails as if the store were down
//! store.set_unavailable(true);
//! assert!(store.get("first-name").await.unwrap_err().is_connection());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use kvconf_core::domain::profile::Profile;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::store::KvStore;

const MEMORY_ADDR: &str = "memory";

/// Injected failure for a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFault {
    Unreachable,
    Corrupt,
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    faults: RwLock<HashMap<String, KeyFault>>,
    unavailable: AtomicBool,
    connects: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a profile, as if the feeder had run
    pub async fn seeded(profile: &Profile) -> Self {
        let store = Self::new();
        {
            let mut entries = store.entries.write().await;
            for (key, value) in profile.entries() {
                entries.insert(key.as_str().to_string(), value.to_string());
            }
        }
        store
    }

    /// Make every operation fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make operations on one key fail with a connection error
    pub async fn fail_key(&self, key: &str) {
        self.faults
            .write()
            .await
            .insert(key.to_string(), KeyFault::Unreachable);
    }

    /// Make operations on one key fail with an unexpected error
    pub async fn corrupt_key(&self, key: &str) {
        self.faults
            .write()
            .await
            .insert(key.to_string(), KeyFault::Corrupt);
    }

    /// Remove all injected per-key faults
    pub async fn clear_faults(&self) {
        self.faults.write().await.clear();
    }

    /// Number of connect attempts seen
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored entries
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().await.clone()
    }

    async fn check(&self, key: &str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::connection(MEMORY_ADDR, "store marked unavailable"));
        }

        match self.faults.read().await.get(key) {
            Some(KeyFault::Unreachable) => Err(StoreError::connection(
                MEMORY_ADDR,
                format!("injected failure for key {}", key),
            )),
            Some(KeyFault::Corrupt) => Err(StoreError::Unexpected(format!(
                "WRONGTYPE operation against key {}",
                key
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn connect(&self) -> Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::connection(MEMORY_ADDR, "store marked unavailable"));
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String> {
        self.check(key).await?;

        self.entries
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check(key).await?;

        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::connection(MEMORY_ADDR, "store marked unavailable"));
        }

        Ok(())
    }

    fn address(&self) -> String {
        MEMORY_ADDR.to_string()
    }
}
