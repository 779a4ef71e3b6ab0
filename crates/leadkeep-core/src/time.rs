use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use thiserror::Error;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("timestamp cannot be empty")]
    Empty,
    #[error("invalid datetime format: expected YYYY-MM-DD or YYYY-MM-DD HH:MM")]
    InvalidDateTime,
    #[error("ambiguous local time: {0}")]
    AmbiguousLocalTime(String),
}

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Parses a local date (`YYYY-MM-DD`, midnight) or date-time into UTC seconds.
pub fn parse_local_timestamp(input: &str) -> Result<i64, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let naive = match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.and_time(Default::default()),
        Err(_) => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .ok_or(TimeParseError::InvalidDateTime)?,
    };

    Local
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc).timestamp())
        .ok_or_else(|| TimeParseError::AmbiguousLocalTime(naive.to_string()))
}

pub fn format_timestamp(ts: i64, pattern: &str) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
        .format(pattern)
        .to_string()
}

pub fn format_timestamp_date(ts: i64) -> String {
    format_timestamp(ts, "%Y-%m-%d")
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    format_timestamp(ts, "%Y-%m-%d %H:%M")
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp_date, format_timestamp_datetime, parse_local_timestamp, TimeParseError};
    use chrono::{Local, TimeZone, Utc};

    #[test]
    fn date_only_means_local_midnight() {
        let ts = parse_local_timestamp("2030-01-15").unwrap();
        let local = Utc.timestamp_opt(ts, 0).unwrap().with_timezone(&Local);
        assert_eq!(
            local.format("%Y-%m-%d %H:%M").to_string(),
            "2030-01-15 00:00"
        );
    }

    #[test]
    fn accepts_t_separator() {
        let ts = parse_local_timestamp("2030-01-15T13:45").unwrap();
        assert_eq!(format_timestamp_datetime(ts), "2030-01-15 13:45");
        assert_eq!(format_timestamp_date(ts), "2030-01-15");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_local_timestamp("next tuesday"),
            Err(TimeParseError::InvalidDateTime)
        ));
        assert!(matches!(
            parse_local_timestamp("  "),
            Err(TimeParseError::Empty)
        ));
    }
}
