//! Core domain types
//!
//! The store layout shared between the feeder (writes) and the config
//! service (reads).

pub mod key;
pub mod profile;
