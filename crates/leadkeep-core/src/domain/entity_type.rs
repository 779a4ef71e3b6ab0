use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification shared by leads and customers.
///
/// Only `Business` entities may carry contact persons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Individual,
    Business,
}

impl EntityType {
    pub const ALL: [EntityType; 2] = [EntityType::Individual, EntityType::Business];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Individual => "individual",
            EntityType::Business => "business",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityType::Individual => "Individual",
            EntityType::Business => "Business",
        }
    }

    pub fn is_business(self) -> bool {
        matches!(self, EntityType::Business)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(EntityType::Individual),
            "business" => Ok(EntityType::Business),
            _ => Err(CoreError::invalid_enum("entity type", raw)),
        }
    }
}
