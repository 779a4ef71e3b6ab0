pub mod contact_persons;
pub mod customers;
pub mod follow_ups;
pub mod leads;
pub mod projects;

pub use contact_persons::{
    ContactDeleteOptions, ContactPersonNew, ContactPersonUpdate, ContactPersonsRepo,
};
pub use customers::{CustomerListOptions, CustomerNew, CustomerUpdate, CustomersRepo};
pub use follow_ups::{FollowUpNew, FollowUpUpdate, FollowUpsRepo, PendingFollowUp};
pub use leads::{LeadListOptions, LeadNew, LeadUpdate, LeadsRepo};
pub use projects::{ProjectNew, ProjectsRepo};

use crate::error::{Result, StoreError};
use leadkeep_core::domain::{EntityType, Owner};
use rusqlite::{Connection, OptionalExtension};
use std::str::FromStr;

/// Which rows a listing returns with respect to soft deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletedFilter {
    #[default]
    Exclude,
    Include,
    Only,
}

impl DeletedFilter {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            DeletedFilter::Exclude => "deleted_at IS NULL",
            DeletedFilter::Include => "1 = 1",
            DeletedFilter::Only => "deleted_at IS NOT NULL",
        }
    }
}

pub(crate) fn owner_table(owner: &Owner) -> &'static str {
    match owner {
        Owner::Lead(_) => "leads",
        Owner::Customer(_) => "customers",
    }
}

/// Entity type of a live (not soft-deleted) owner.
pub(crate) fn live_owner_entity_type(conn: &Connection, owner: &Owner) -> Result<EntityType> {
    let raw: Option<String> = conn
        .query_row(
            &format!(
                "SELECT entity_type FROM {} WHERE id = ?1 AND deleted_at IS NULL;",
                owner_table(owner)
            ),
            [owner.id_string()],
            |row| row.get(0),
        )
        .optional()?;
    let raw = raw.ok_or_else(|| StoreError::NotFound(owner.to_string()))?;
    Ok(EntityType::from_str(&raw)?)
}

pub(crate) fn parse_id<T: FromStr>(raw: String) -> Result<T> {
    T::from_str(&raw).map_err(|_| StoreError::InvalidId(raw))
}

pub(crate) fn parse_opt_id<T: FromStr>(raw: Option<String>) -> Result<Option<T>> {
    raw.map(parse_id).transpose()
}

pub(crate) fn owner_from_columns(kind: &str, id: &str) -> Result<Owner> {
    Ok(Owner::from_parts(kind, id)?)
}
