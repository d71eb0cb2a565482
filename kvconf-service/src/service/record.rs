//! Record Service
//!
//! Assembles a [`Record`] from three independent store reads. A failed read
//! degrades only its own field to the sentinel; the record itself is always
//! produced.

use kvconf_client::{KvStore, RetryPolicy, StoreError};
use kvconf_core::SENTINEL;
use kvconf_core::domain::key::FieldKey;
use kvconf_core::dto::record::Record;

/// Read all three keys concurrently and assemble the record
pub async fn load_record(
    store: &dyn KvStore,
    retry: &RetryPolicy,
    app_version: Option<String>,
) -> Record {
    let (first_name, last_name, environment) = tokio::join!(
        read_field(store, retry, FieldKey::FirstName),
        read_field(store, retry, FieldKey::LastName),
        read_field(store, retry, FieldKey::Environment),
    );

    Record {
        app_version,
        first_name,
        last_name,
        environment,
    }
}

/// Read one key, substituting the sentinel on any failure
async fn read_field(store: &dyn KvStore, retry: &RetryPolicy, key: FieldKey) -> String {
    let what = format!("get {}", key);

    match retry.run(&what, move || store.get(key.as_str())).await {
        Ok(value) => value,
        Err(StoreError::NotFound(_)) => {
            tracing::debug!(key = %key, "Key not set, serving sentinel");
            SENTINEL.to_string()
        }
        Err(e @ StoreError::Connection { .. }) => {
            tracing::warn!(key = %key, error = %e, "Store unreachable, serving sentinel");
            SENTINEL.to_string()
        }
        Err(e) => {
            tracing::error!(key = %key, error = %e, "Unexpected store error, serving sentinel");
            SENTINEL.to_string()
        }
    }
}
