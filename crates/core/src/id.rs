//! Strongly-typed identifiers used across the domain.
//!
//! Ids are operator-chosen strings (e.g. `storage_001`), so they are validated
//! for emptiness only. Ordering is lexicographic, which the allocation tie-break
//! relies on.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a stored item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

/// Identifier of a storage container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerId(String);

/// Identifier of a waste container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WasteContainerId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build an identifier, rejecting blank input.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_input(concat!($name, " cannot be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_string_newtype!(ItemId, "item id");
impl_string_newtype!(ContainerId, "container id");
impl_string_newtype!(WasteContainerId, "waste container id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        assert!(matches!(ItemId::new("   "), Err(DomainError::InvalidInput(_))));
        assert!("".parse::<ContainerId>().is_err());
    }

    #[test]
    fn ids_are_trimmed_and_ordered_lexicographically() {
        let a = ContainerId::new(" storage_001 ").unwrap();
        let b = ContainerId::new("storage_002").unwrap();
        assert_eq!(a.as_str(), "storage_001");
        assert!(a < b);
    }

    #[test]
    fn serde_rejects_blank_ids() {
        let ok: WasteContainerId = serde_json::from_str("\"waste_001\"").unwrap();
        assert_eq!(ok.to_string(), "waste_001");
        assert!(serde_json::from_str::<WasteContainerId>("\"\"").is_err());
    }
}
