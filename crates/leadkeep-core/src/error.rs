use thiserror::Error;

use crate::domain::EntityType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("contact persons can only be attached to business entities (owner is {0})")]
    InvalidOwnerType(EntityType),
    #[error("owner already has a primary contact")]
    MultiplePrimaryContacts,
    #[error("cannot delete the only contact of a business entity")]
    CannotDeleteOnlyContact,
    #[error("field cannot be changed after creation: {0}")]
    ImmutableFieldAttempt(&'static str),
    #[error("name is required")]
    EmptyName,
    #[error("invalid {field} value: {value}")]
    InvalidEnumValue { field: &'static str, value: String },
    #[error("invalid owner reference: {0}")]
    InvalidOwnerRef(String),
    #[error("invalid soon days: {0}")]
    InvalidSoonDays(i64),
}

impl CoreError {
    pub(crate) fn invalid_enum(field: &'static str, value: &str) -> Self {
        CoreError::InvalidEnumValue {
            field,
            value: value.to_string(),
        }
    }
}
