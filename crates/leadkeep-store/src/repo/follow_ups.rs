use crate::db::in_transaction;
use crate::error::{Result, StoreError};
use crate::repo::{live_owner_entity_type, owner_from_columns, parse_id, parse_opt_id};
use leadkeep_core::domain::{FollowUp, FollowUpId, FollowUpStatus, Owner, UserId};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use tracing::debug;

const FOLLOW_UP_COLUMNS: &str = "f.id, f.owner_kind, f.owner_id, f.due_at, f.notes, f.status, \
     f.created_by, f.completed_by, f.completed_at, f.created_at, f.updated_at";

#[derive(Debug, Clone, Default)]
pub struct FollowUpNew {
    pub due_at: i64,
    pub notes: Option<String>,
    /// Defaults to pending.
    pub status: Option<FollowUpStatus>,
}

/// Plain field merge. Setting the status here never stamps completion; use
/// [`FollowUpsRepo::mark_completed`] for that.
#[derive(Debug, Clone, Default)]
pub struct FollowUpUpdate {
    pub due_at: Option<i64>,
    pub notes: Option<Option<String>>,
    pub status: Option<FollowUpStatus>,
}

impl FollowUpUpdate {
    pub fn is_empty(&self) -> bool {
        self.due_at.is_none() && self.notes.is_none() && self.status.is_none()
    }
}

/// A pending follow-up together with the display name of its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFollowUp {
    pub follow_up: FollowUp,
    pub owner_name: String,
}

pub struct FollowUpsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> FollowUpsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Leads and customers of either entity type may carry follow-ups.
    pub fn add(
        &self,
        now_utc: i64,
        owner: Owner,
        input: FollowUpNew,
        actor: UserId,
    ) -> Result<FollowUp> {
        in_transaction(self.conn, |conn| {
            live_owner_entity_type(conn, &owner)?;
            let follow_up = FollowUp {
                id: FollowUpId::new(),
                owner,
                due_at: input.due_at,
                notes: input.notes,
                status: input.status.unwrap_or(FollowUpStatus::Pending),
                created_by: actor,
                completed_by: None,
                completed_at: None,
                created_at: now_utc,
                updated_at: now_utc,
            };
            conn.execute(
                "INSERT INTO follow_ups (id, owner_kind, owner_id, due_at, notes, status, created_by,
                     completed_by, completed_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    follow_up.id.to_string(),
                    follow_up.owner.kind().as_str(),
                    follow_up.owner.id_string(),
                    follow_up.due_at,
                    follow_up.notes,
                    follow_up.status.as_str(),
                    follow_up.created_by.to_string(),
                    Option::<String>::None,
                    Option::<i64>::None,
                    follow_up.created_at,
                    follow_up.updated_at,
                ],
            )?;
            debug!(follow_up = %follow_up.id, owner = %owner, "follow-up added");
            Ok(follow_up)
        })
    }

    pub fn update(&self, now_utc: i64, id: FollowUpId, update: FollowUpUpdate) -> Result<FollowUp> {
        in_transaction(self.conn, |conn| {
            let mut follow_up = require(conn, id)?;
            if let Some(value) = update.due_at {
                follow_up.due_at = value;
            }
            if let Some(value) = update.notes {
                follow_up.notes = value;
            }
            if let Some(value) = update.status {
                follow_up.status = value;
            }
            follow_up.updated_at = now_utc;
            save(conn, &follow_up)?;
            Ok(follow_up)
        })
    }

    pub fn mark_completed(&self, now_utc: i64, id: FollowUpId, actor: UserId) -> Result<FollowUp> {
        in_transaction(self.conn, |conn| {
            let mut follow_up = require(conn, id)?;
            follow_up.complete(now_utc, actor);
            save(conn, &follow_up)?;
            debug!(follow_up = %id, actor = %actor, "follow-up completed");
            Ok(follow_up)
        })
    }

    pub fn mark_cancelled(&self, now_utc: i64, id: FollowUpId) -> Result<FollowUp> {
        in_transaction(self.conn, |conn| {
            let mut follow_up = require(conn, id)?;
            follow_up.cancel(now_utc);
            save(conn, &follow_up)?;
            debug!(follow_up = %id, "follow-up cancelled");
            Ok(follow_up)
        })
    }

    pub fn delete(&self, id: FollowUpId) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM follow_ups WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn get(&self, id: FollowUpId) -> Result<Option<FollowUp>> {
        get_inner(self.conn, id)
    }

    /// Soonest first.
    pub fn list_for_owner(&self, owner: Owner) -> Result<Vec<FollowUp>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FOLLOW_UP_COLUMNS} FROM follow_ups f
             WHERE f.owner_kind = ?1 AND f.owner_id = ?2
             ORDER BY f.due_at ASC, f.created_at ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.kind().as_str(), owner.id_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(follow_up_from_row(row)?);
        }
        Ok(items)
    }

    /// Pending follow-ups due strictly before `cutoff`, soonest first.
    pub fn list_pending_due_before(&self, cutoff: i64) -> Result<Vec<PendingFollowUp>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FOLLOW_UP_COLUMNS}, COALESCE(l.name, c.name, '') AS owner_name
             FROM follow_ups f
             LEFT JOIN leads l ON f.owner_kind = 'lead' AND l.id = f.owner_id
             LEFT JOIN customers c ON f.owner_kind = 'customer' AND c.id = f.owner_id
             WHERE f.status = ?1 AND f.due_at < ?2
             ORDER BY f.due_at ASC, owner_name COLLATE NOCASE ASC;"
        ))?;
        let mut rows = stmt.query(params![FollowUpStatus::Pending.as_str(), cutoff])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(PendingFollowUp {
                follow_up: follow_up_from_row(row)?,
                owner_name: row.get(11)?,
            });
        }
        Ok(items)
    }

    pub fn list_overdue(&self, now_utc: i64) -> Result<Vec<PendingFollowUp>> {
        self.list_pending_due_before(now_utc)
    }
}

fn require(conn: &Connection, id: FollowUpId) -> Result<FollowUp> {
    get_inner(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
}

fn save(conn: &Connection, follow_up: &FollowUp) -> Result<()> {
    conn.execute(
        "UPDATE follow_ups SET due_at = ?2, notes = ?3, status = ?4, completed_by = ?5,
             completed_at = ?6, updated_at = ?7
         WHERE id = ?1;",
        params![
            follow_up.id.to_string(),
            follow_up.due_at,
            follow_up.notes,
            follow_up.status.as_str(),
            follow_up.completed_by.map(|id| id.to_string()),
            follow_up.completed_at,
            follow_up.updated_at,
        ],
    )?;
    Ok(())
}

fn get_inner(conn: &Connection, id: FollowUpId) -> Result<Option<FollowUp>> {
    conn.query_row(
        &format!("SELECT {FOLLOW_UP_COLUMNS} FROM follow_ups f WHERE f.id = ?1;"),
        [id.to_string()],
        |row| Ok(follow_up_from_row(row)),
    )
    .optional()?
    .transpose()
}

fn follow_up_from_row(row: &rusqlite::Row<'_>) -> Result<FollowUp> {
    let owner_kind: String = row.get(1)?;
    let owner_id: String = row.get(2)?;
    let status: String = row.get(5)?;
    Ok(FollowUp {
        id: parse_id(row.get(0)?)?,
        owner: owner_from_columns(&owner_kind, &owner_id)?,
        due_at: row.get(3)?,
        notes: row.get(4)?,
        status: FollowUpStatus::from_str(&status)?,
        created_by: parse_id(row.get(6)?)?,
        completed_by: parse_opt_id(row.get(7)?)?,
        completed_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
