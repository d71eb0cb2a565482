//! Error types for the store client

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur when talking to the key-value store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached, refused the connection, dropped it,
    /// or did not answer within the configured timeout
    #[error("store unreachable at {addr}: {reason}")]
    Connection {
        /// Address of the store (`host:port`)
        addr: String,
        /// Underlying cause
        reason: String,
    },

    /// The key has never been set
    #[error("key not found: {0}")]
    NotFound(String),

    /// The connection options could not be turned into a client
    #[error("invalid store options: {0}")]
    InvalidOptions(String),

    /// Anything else the store answered with (wrong type, protocol error, ...)
    #[error("unexpected store error: {0}")]
    Unexpected(String),
}

impl StoreError {
    /// Create a connection error for the given address
    pub fn connection(addr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            addr: addr.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error means the store is unreachable
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
