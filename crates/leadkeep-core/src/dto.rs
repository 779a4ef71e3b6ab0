use crate::domain::{
    ContactPerson, Customer, CustomerId, FollowUp, FollowUpId, FollowUpStatus, Lead, Owner,
    Project,
};
use crate::rules::DueState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDetailDto {
    #[serde(flatten)]
    pub lead: Lead,
    pub can_be_converted: bool,
    pub is_converted: bool,
    pub customer_id: Option<CustomerId>,
    pub contacts: Vec<ContactPerson>,
    pub follow_ups: Vec<FollowUp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetailDto {
    #[serde(flatten)]
    pub customer: Customer,
    pub contacts: Vec<ContactPerson>,
    pub follow_ups: Vec<FollowUp>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpItemDto {
    pub id: FollowUpId,
    pub owner: Owner,
    pub owner_name: String,
    pub due_at: i64,
    pub due_state: DueState,
    pub status: FollowUpStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOutputDto {
    pub overdue: Vec<FollowUpItemDto>,
    pub today: Vec<FollowUpItemDto>,
    pub soon: Vec<FollowUpItemDto>,
}

impl ReminderOutputDto {
    /// Buckets items by due state; scheduled items are dropped.
    pub fn from_items(items: Vec<FollowUpItemDto>) -> Self {
        let mut output = Self {
            overdue: Vec::new(),
            today: Vec::new(),
            soon: Vec::new(),
        };
        for item in items {
            match item.due_state {
                DueState::Overdue => output.overdue.push(item),
                DueState::Today => output.today.push(item),
                DueState::Soon => output.soon.push(item),
                DueState::Scheduled => {}
            }
        }
        output
    }

    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.today.is_empty() && self.soon.is_empty()
    }
}
