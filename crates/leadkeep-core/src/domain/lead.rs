use crate::domain::entity_type::EntityType;
use crate::domain::ids::{BusinessId, LeadId, ServiceId, UserId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Referral,
    SocialMedia,
    ColdCall,
    Advertisement,
    Event,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 7] = [
        LeadSource::Website,
        LeadSource::Referral,
        LeadSource::SocialMedia,
        LeadSource::ColdCall,
        LeadSource::Advertisement,
        LeadSource::Event,
        LeadSource::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadSource::Website => "website",
            LeadSource::Referral => "referral",
            LeadSource::SocialMedia => "social_media",
            LeadSource::ColdCall => "cold_call",
            LeadSource::Advertisement => "advertisement",
            LeadSource::Event => "event",
            LeadSource::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeadSource::Website => "Website",
            LeadSource::Referral => "Referral",
            LeadSource::SocialMedia => "Social Media",
            LeadSource::ColdCall => "Cold Call",
            LeadSource::Advertisement => "Advertisement",
            LeadSource::Event => "Event",
            LeadSource::Other => "Other",
        }
    }
}

impl FromStr for LeadSource {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase().replace('-', "_");
        LeadSource::ALL
            .into_iter()
            .find(|source| source.as_str() == value)
            .ok_or_else(|| CoreError::invalid_enum("lead source", raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Proposal,
        LeadStatus::Negotiation,
        LeadStatus::Won,
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Proposal => "proposal",
            LeadStatus::Negotiation => "negotiation",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Proposal => "Proposal",
            LeadStatus::Negotiation => "Negotiation",
            LeadStatus::Won => "Won",
            LeadStatus::Lost => "Lost",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| CoreError::invalid_enum("lead status", raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub entity_type: EntityType,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub assigned_to: Option<UserId>,
    pub business_id: Option<BusinessId>,
    pub service_id: Option<ServiceId>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl Lead {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::EmptyName);
        }
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{LeadSource, LeadStatus};
    use std::str::FromStr;

    #[test]
    fn source_accepts_dashed_input() {
        assert_eq!(
            LeadSource::from_str("Cold-Call").unwrap(),
            LeadSource::ColdCall
        );
    }

    #[test]
    fn status_round_trips_storage_form() {
        for status in LeadStatus::ALL {
            assert_eq!(LeadStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_unknown() {
        let err = LeadStatus::from_str("closed").unwrap_err();
        assert_eq!(err.to_string(), "invalid lead status value: closed");
    }
}
