use crate::domain::ids::{CustomerId, LeadId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Lead,
    Customer,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Lead => "lead",
            OwnerKind::Customer => "customer",
        }
    }
}

impl FromStr for OwnerKind {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lead" => Ok(OwnerKind::Lead),
            "customer" => Ok(OwnerKind::Customer),
            _ => Err(CoreError::invalid_enum("owner kind", raw)),
        }
    }
}

/// Tagged reference to the lead or customer that owns contact persons and
/// follow-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Owner {
    Lead(LeadId),
    Customer(CustomerId),
}

impl Owner {
    pub fn kind(&self) -> OwnerKind {
        match self {
            Owner::Lead(_) => OwnerKind::Lead,
            Owner::Customer(_) => OwnerKind::Customer,
        }
    }

    pub fn id_string(&self) -> String {
        match self {
            Owner::Lead(id) => id.to_string(),
            Owner::Customer(id) => id.to_string(),
        }
    }

    pub fn from_parts(kind: &str, id: &str) -> Result<Self, CoreError> {
        let kind = OwnerKind::from_str(kind)?;
        let invalid = || CoreError::InvalidOwnerRef(format!("{}:{}", kind.as_str(), id));
        match kind {
            OwnerKind::Lead => Ok(Owner::Lead(LeadId::from_str(id).map_err(|_| invalid())?)),
            OwnerKind::Customer => Ok(Owner::Customer(
                CustomerId::from_str(id).map_err(|_| invalid())?,
            )),
        }
    }
}

impl From<LeadId> for Owner {
    fn from(id: LeadId) -> Self {
        Owner::Lead(id)
    }
}

impl From<CustomerId> for Owner {
    fn from(id: CustomerId) -> Self {
        Owner::Customer(id)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.id_string())
    }
}

/// Parses `lead:<uuid>` or `customer:<uuid>`.
impl FromStr for Owner {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (kind, id) = trimmed
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidOwnerRef(trimmed.to_string()))?;
        Owner::from_parts(kind, id.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::{Owner, OwnerKind};
    use crate::domain::ids::{CustomerId, LeadId};
    use crate::error::CoreError;
    use std::str::FromStr;

    #[test]
    fn display_and_parse_agree() {
        let owner = Owner::Customer(CustomerId::new());
        let parsed = Owner::from_str(&owner.to_string()).unwrap();
        assert_eq!(parsed, owner);
        assert_eq!(parsed.kind(), OwnerKind::Customer);
    }

    #[test]
    fn parse_rejects_missing_kind() {
        let id = LeadId::new().to_string();
        let err = Owner::from_str(&id).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOwnerRef(_)));
    }

    #[test]
    fn parse_rejects_bad_uuid() {
        let err = Owner::from_str("lead:not-a-uuid").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidOwnerRef("lead:not-a-uuid".to_string())
        );
    }
}
