//! Profile domain types

use crate::domain::key::FieldKey;

/// Default first name written when none is given
pub const DEFAULT_FIRST_NAME: &str = "Beyond";
/// Default last name written when none is given
pub const DEFAULT_LAST_NAME: &str = "Creation";
/// Default environment written when none is given
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// The triple the feeder writes to the store
///
/// Values are opaque and never validated or normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub environment: String,
}

impl Profile {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            environment: environment.into(),
        }
    }

    /// Value held for a given key
    pub fn value(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::FirstName => &self.first_name,
            FieldKey::LastName => &self.last_name,
            FieldKey::Environment => &self.environment,
        }
    }

    /// Key/value pairs in write order
    pub fn entries(&self) -> [(FieldKey, &str); 3] {
        FieldKey::ALL.map(|key| (key, self.value(key)))
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_NAME, DEFAULT_LAST_NAME, DEFAULT_ENVIRONMENT)
    }
}
