//! kvconf Store Client
//!
//! A small, typed client for the key-value store shared by the feeder and
//! the config service.
//!
//! The crate provides:
//! - [`KvStore`]: the get/set/ping contract both sides are written against
//! - [`RedisStore`]: the network implementation with connect and response timeouts
//! - [`MemoryStore`]: an in-process implementation with failure injection
//! - [`RetryPolicy`]: caller-side retries for connection failures
//!
//! # Example
//!
//! ```no_run
//! use kvconf_client::{KvStore, RedisStore, StoreOptions};
//!
//! #[tokio::main]
//! async fn main() -> kvconf_client::Result<()> {
//!     let store = RedisStore::new(StoreOptions::new("redis-server", 6379))?;
//!     store.connect().await?;
//!
//!     store.set("first-name", "Beyond").await?;
//!     println!("first-name = {}", store.get("first-name").await?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod options;
pub mod redis_store;
pub mod retry;
mod store;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use options::StoreOptions;
pub use redis_store::RedisStore;
pub use retry::RetryPolicy;
pub use store::KvStore;
