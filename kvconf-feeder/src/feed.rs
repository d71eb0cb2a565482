//! Feed command
//!
//! Writes the profile triple into the store. The three writes are issued
//! sequentially and are not atomic: a concurrent reader may see some keys
//! from this run and some from the previous one.
//!
//! Any failure is fatal. There is no retry and no per-key partial-success
//! report; keys written before the failure stay written.

use colored::*;
use kvconf_client::{KvStore, Result, StoreError};
use kvconf_core::domain::profile::Profile;
use tracing::{debug, info};

/// Exit status when every write was accepted
pub const EXIT_OK: u8 = 0;
/// Exit status when the store could not be reached or refused a write
pub const EXIT_STORE_FAILURE: u8 = 1;

/// Connect once, then write the three keys in order
pub async fn feed(store: &dyn KvStore, profile: &Profile) -> Result<()> {
    store.connect().await?;

    for (key, value) in profile.entries() {
        store.set(key.as_str(), value).await?;
        debug!(key = %key, "Wrote key");
    }

    info!("Wrote {} keys to {}", profile.entries().len(), store.address());

    Ok(())
}

/// Run the feed and translate the outcome into an exit status
pub async fn run(store: &dyn KvStore, profile: &Profile) -> u8 {
    match feed(store, profile).await {
        Ok(()) => {
            println!("{}", "✓ Profile stored".green().bold());
            println!("  {}: {}", "first-name".bold(), profile.first_name);
            println!("  {}: {}", "last-name".bold(), profile.last_name);
            println!("  {}: {}", "environment".bold(), profile.environment);
            EXIT_OK
        }
        Err(e @ StoreError::Connection { .. }) => {
            eprintln!(
                "{}",
                format!("Not possible to connect to {}", store.address()).red()
            );
            eprintln!("  {}", e.to_string().dimmed());
            EXIT_STORE_FAILURE
        }
        Err(e) => {
            eprintln!(
                "{}",
                format!("Store at {} rejected the write", store.address()).red()
            );
            eprintln!("  {}", e.to_string().dimmed());
            EXIT_STORE_FAILURE
        }
    }
}
