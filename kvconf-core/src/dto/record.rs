//! Record DTO served by the config service

use serde::Serialize;

use crate::SENTINEL;
use crate::domain::key::FieldKey;

/// The record returned by `GET /`
///
/// All four fields are always serialized. A missing `app_version` renders as
/// JSON `null`; the store-backed fields carry [`SENTINEL`] when their read
/// failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "app-version")]
    pub app_version: Option<String>,
    #[serde(rename = "first-name")]
    pub first_name: String,
    #[serde(rename = "last-name")]
    pub last_name: String,
    pub environment: String,
}

impl Record {
    /// Record with every store-backed field set to the sentinel
    pub fn degraded(app_version: Option<String>) -> Self {
        Self {
            app_version,
            first_name: SENTINEL.to_string(),
            last_name: SENTINEL.to_string(),
            environment: SENTINEL.to_string(),
        }
    }

    /// Set the field backing a store key
    pub fn set_field(&mut self, key: FieldKey, value: String) {
        match key {
            FieldKey::FirstName => self.first_name = value,
            FieldKey::LastName => self.last_name = value,
            FieldKey::Environment => self.environment = value,
        }
    }

    /// Whether any store-backed field holds the sentinel
    pub fn is_degraded(&self) -> bool {
        [&self.first_name, &self.last_name, &self.environment]
            .iter()
            .any(|v| v.as_str() == SENTINEL)
    }
}
