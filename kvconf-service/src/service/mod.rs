//! Service Module
//!
//! Business logic for the config service.

pub mod record;

// Re-export for convenience
pub use record as record_service;
