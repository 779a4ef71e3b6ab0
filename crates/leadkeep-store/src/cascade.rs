//! Dependent-record cleanup for leads and customers.
//!
//! Contact persons and follow-ups reference their owner through an
//! `(owner_kind, owner_id)` pair, so SQLite cannot cascade them on its own.
//! Each entry point runs inside a single transaction: if any step fails,
//! nothing is removed, the owner included.

use crate::db::in_transaction;
use crate::error::{Result, StoreError};
use crate::repo::owner_table;
use leadkeep_core::domain::Owner;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

/// Number of dependent rows removed alongside an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeSummary {
    pub contact_persons: usize,
    pub follow_ups: usize,
    pub projects: usize,
}

/// Removes the owner's contact persons, follow-ups and (for customers)
/// projects, then soft-deletes the owner.
pub fn delete_owner_cascade(conn: &Connection, now_utc: i64, owner: Owner) -> Result<CascadeSummary> {
    in_transaction(conn, |conn| {
        let table = owner_table(&owner);
        let live: Option<i64> = conn
            .query_row(
                &format!("SELECT 1 FROM {table} WHERE id = ?1 AND deleted_at IS NULL;"),
                [owner.id_string()],
                |row| row.get(0),
            )
            .optional()?;
        if live.is_none() {
            return Err(StoreError::NotFound(owner.to_string()));
        }

        let summary = remove_dependents(conn, &owner)?;
        conn.execute(
            &format!("UPDATE {table} SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1;"),
            params![owner.id_string(), now_utc],
        )?;
        info!(
            owner = %owner,
            contact_persons = summary.contact_persons,
            follow_ups = summary.follow_ups,
            projects = summary.projects,
            "owner deleted"
        );
        Ok(summary)
    })
}

/// Hard-deletes the owner row, live or soft-deleted, after its dependents.
pub fn purge_owner(conn: &Connection, owner: Owner) -> Result<CascadeSummary> {
    in_transaction(conn, |conn| {
        let summary = remove_dependents(conn, &owner)?;
        let removed = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", owner_table(&owner)),
            [owner.id_string()],
        )?;
        if removed == 0 {
            return Err(StoreError::NotFound(owner.to_string()));
        }
        info!(owner = %owner, "owner purged");
        Ok(summary)
    })
}

fn remove_dependents(conn: &Connection, owner: &Owner) -> Result<CascadeSummary> {
    let kind = owner.kind().as_str();
    let id = owner.id_string();

    let contact_persons = conn.execute(
        "DELETE FROM contact_persons WHERE owner_kind = ?1 AND owner_id = ?2;",
        params![kind, id],
    )?;
    let follow_ups = conn.execute(
        "DELETE FROM follow_ups WHERE owner_kind = ?1 AND owner_id = ?2;",
        params![kind, id],
    )?;
    let projects = match owner {
        Owner::Customer(_) => conn.execute("DELETE FROM projects WHERE customer_id = ?1;", [&id])?,
        Owner::Lead(_) => 0,
    };

    Ok(CascadeSummary {
        contact_persons,
        follow_ups,
        projects,
    })
}
