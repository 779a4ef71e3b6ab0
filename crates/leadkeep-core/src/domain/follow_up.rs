use crate::domain::ids::{FollowUpId, UserId};
use crate::domain::owner::Owner;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStatus {
    Pending,
    Completed,
    Cancelled,
}

impl FollowUpStatus {
    pub const ALL: [FollowUpStatus; 3] = [
        FollowUpStatus::Pending,
        FollowUpStatus::Completed,
        FollowUpStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FollowUpStatus::Pending => "pending",
            FollowUpStatus::Completed => "completed",
            FollowUpStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FollowUpStatus::Pending => "Pending",
            FollowUpStatus::Completed => "Completed",
            FollowUpStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, FollowUpStatus::Pending)
    }
}

impl FromStr for FollowUpStatus {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(FollowUpStatus::Pending),
            "completed" | "done" => Ok(FollowUpStatus::Completed),
            "cancelled" | "canceled" => Ok(FollowUpStatus::Cancelled),
            _ => Err(CoreError::invalid_enum("follow-up status", raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: FollowUpId,
    pub owner: Owner,
    pub due_at: i64,
    pub notes: Option<String>,
    pub status: FollowUpStatus,
    pub created_by: UserId,
    pub completed_by: Option<UserId>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl FollowUp {
    pub fn is_overdue(&self, now_utc: i64) -> bool {
        self.status == FollowUpStatus::Pending && self.due_at < now_utc
    }

    /// Stamps completion. Calling it again re-stamps; terminal states are not
    /// guarded.
    pub fn complete(&mut self, now_utc: i64, actor: UserId) {
        self.status = FollowUpStatus::Completed;
        self.completed_by = Some(actor);
        self.completed_at = Some(now_utc);
        self.updated_at = now_utc;
    }

    /// Completion fields are left as they were.
    pub fn cancel(&mut self, now_utc: i64) {
        self.status = FollowUpStatus::Cancelled;
        self.updated_at = now_utc;
    }
}

#[cfg(test)]
mod tests {
    use super::{FollowUp, FollowUpStatus};
    use crate::domain::ids::{FollowUpId, LeadId, UserId};
    use crate::domain::owner::Owner;

    fn pending(due_at: i64) -> FollowUp {
        FollowUp {
            id: FollowUpId::new(),
            owner: Owner::Lead(LeadId::new()),
            due_at,
            notes: None,
            status: FollowUpStatus::Pending,
            created_by: UserId::new(),
            completed_by: None,
            completed_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn overdue_requires_pending_and_past_due() {
        let mut follow_up = pending(100);
        assert!(follow_up.is_overdue(101));
        assert!(!follow_up.is_overdue(100));

        follow_up.cancel(150);
        assert!(!follow_up.is_overdue(200));
    }

    #[test]
    fn cancel_after_complete_keeps_completion_stamp() {
        let actor = UserId::new();
        let mut follow_up = pending(100);
        follow_up.complete(120, actor);
        follow_up.cancel(130);

        assert_eq!(follow_up.status, FollowUpStatus::Cancelled);
        assert_eq!(follow_up.completed_by, Some(actor));
        assert_eq!(follow_up.completed_at, Some(120));
    }

    #[test]
    fn complete_restamps() {
        let first = UserId::new();
        let second = UserId::new();
        let mut follow_up = pending(100);
        follow_up.complete(120, first);
        follow_up.complete(140, second);

        assert_eq!(follow_up.completed_by, Some(second));
        assert_eq!(follow_up.completed_at, Some(140));
    }
}
