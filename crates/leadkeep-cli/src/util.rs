use crate::error::invalid_input;
use anyhow::Result;
use leadkeep_core::domain::Owner;
use leadkeep_store::repo::DeletedFilter;
use std::str::FromStr;

/// Parses a UUID-backed id, naming `label` in the error.
pub fn parse_id<T: FromStr>(raw: &str, label: &str) -> Result<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input(format!("{label} id cannot be empty")));
    }
    T::from_str(trimmed).map_err(|_| invalid_input(format!("invalid {label} id: {trimmed}")))
}

/// `lead:<id>` or `customer:<id>`.
pub fn parse_owner(raw: &str) -> Result<Owner> {
    Ok(Owner::from_str(raw)?)
}

/// Blank input clears an optional field.
pub fn normalize_optional_value(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Like [`normalize_optional_value`] for id columns: blank clears, anything
/// else must parse.
pub fn optional_id<T: FromStr>(value: String, label: &str) -> Result<Option<T>> {
    match normalize_optional_value(value) {
        Some(raw) => Ok(Some(parse_id(&raw, label)?)),
        None => Ok(None),
    }
}

pub fn parse_opt<T>(raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(raw.map(|value| T::from_str(value.trim())).transpose()?)
}

pub fn deleted_filter(include_deleted: bool, only_deleted: bool) -> DeletedFilter {
    if only_deleted {
        DeletedFilter::Only
    } else if include_deleted {
        DeletedFilter::Include
    } else {
        DeletedFilter::Exclude
    }
}
