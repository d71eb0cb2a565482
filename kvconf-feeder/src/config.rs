//! Configuration module
//!
//! Handles feeder configuration: where the store lives and what to write.

use kvconf_client::StoreOptions;
use kvconf_core::domain::profile::Profile;

/// Feeder configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Store location and timeouts
    pub store: StoreOptions,
    /// Values to write
    pub profile: Profile,
}
