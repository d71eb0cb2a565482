//! Store key domain types

use std::fmt;

/// One of the three keys held in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    FirstName,
    LastName,
    Environment,
}

impl FieldKey {
    /// All keys, in the order the feeder writes them
    pub const ALL: [FieldKey; 3] = [
        FieldKey::FirstName,
        FieldKey::LastName,
        FieldKey::Environment,
    ];

    /// Key name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::FirstName => "first-name",
            FieldKey::LastName => "last-name",
            FieldKey::Environment => "environment",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_match_store_layout() {
        let names: Vec<&str> = FieldKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["first-name", "last-name", "environment"]);
    }

    #[test]
    fn test_key_displays_as_store_name() {
        assert_eq!(FieldKey::LastName.to_string(), "last-name");
        assert_eq!(FieldKey::Environment.to_string(), "environment");
    }
}
