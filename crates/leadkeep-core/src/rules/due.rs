use crate::error::CoreError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_SOON_DAYS: i64 = 365;

/// Where a pending follow-up sits relative to the local calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueState {
    Overdue,
    Today,
    Soon,
    Scheduled,
}

impl DueState {
    pub fn as_str(self) -> &'static str {
        match self {
            DueState::Overdue => "overdue",
            DueState::Today => "today",
            DueState::Soon => "soon",
            DueState::Scheduled => "scheduled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueBounds {
    pub start_of_today: i64,
    pub start_of_tomorrow: i64,
    pub soon_end: i64,
}

pub fn validate_soon_days(soon_days: i64) -> Result<i64, CoreError> {
    if !(0..=MAX_SOON_DAYS).contains(&soon_days) {
        return Err(CoreError::InvalidSoonDays(soon_days));
    }
    Ok(soon_days)
}

pub fn compute_due_state(
    now_utc: i64,
    due_at: i64,
    soon_days: i64,
    local_offset: FixedOffset,
) -> DueState {
    if due_at < now_utc {
        return DueState::Overdue;
    }

    let bounds = due_bounds(now_utc, soon_days, local_offset);

    if due_at >= bounds.start_of_today && due_at < bounds.start_of_tomorrow {
        return DueState::Today;
    }

    if due_at >= bounds.start_of_tomorrow && due_at < bounds.soon_end {
        return DueState::Soon;
    }

    DueState::Scheduled
}

pub fn due_bounds(now_utc: i64, soon_days: i64, local_offset: FixedOffset) -> DueBounds {
    let now = DateTime::<Utc>::from_timestamp(now_utc, 0).unwrap_or_default();
    let local_date = now.with_timezone(&local_offset).date_naive();
    let start_of_today_local = local_date.and_time(NaiveTime::default());
    let start_of_tomorrow_local = start_of_today_local + Duration::days(1);
    // Fixed offsets have no gaps, so the local-to-UTC mapping is always single.
    let to_utc = |naive: NaiveDateTime| {
        local_offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc).timestamp())
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive).timestamp())
    };
    let start_of_today = to_utc(start_of_today_local);
    let start_of_tomorrow = to_utc(start_of_tomorrow_local);

    DueBounds {
        start_of_today,
        start_of_tomorrow,
        soon_end: start_of_tomorrow + Duration::days(soon_days).num_seconds(),
    }
}
