//! Strongly-typed ID wrappers for every ledger table
//!
//! Newtype wrappers keep a subcategory id from being passed where an account
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate an ID newtype wrapper
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The full hyphenated UUID
            pub fn full(&self) -> String {
                self.0.to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            /// Parses a full UUID, with or without the display prefix
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(UserId, "usr-");
define_id!(AccountId, "acc-");
define_id!(CategoryId, "cat-");
define_id!(SubcategoryId, "sub-");
define_id!(TransactionId, "txn-");
define_id!(GoalId, "gol-");
define_id!(PayeeId, "pay-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_prefixed_and_short() {
        let id = SubcategoryId::new();
        let display = id.to_string();
        assert!(display.starts_with("sub-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_parse_full_uuid_with_and_without_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let plain: GoalId = uuid_str.parse().unwrap();
        let prefixed: GoalId = format!("gol-{}", uuid_str).parse().unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain.full(), uuid_str);
    }

    #[test]
    fn test_parse_rejects_short_form() {
        assert!("sub-550e8400".parse::<SubcategoryId>().is_err());
    }

    #[test]
    fn test_serialization_is_bare_uuid() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.full()));
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
