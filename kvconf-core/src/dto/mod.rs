//! Data Transfer Objects
//!
//! Wire representations served by the config service.

pub mod record;
