use crate::domain::ids::ContactPersonId;
use crate::domain::owner::Owner;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
    pub id: ContactPersonId,
    pub owner: Owner,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub is_primary: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ContactPerson {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::EmptyName);
        }
        Ok(())
    }
}
