use crate::cascade::{self, CascadeSummary};
use crate::db::{in_immediate_transaction, in_transaction};
use crate::error::{Result, StoreError};
use crate::repo::contact_persons::ensure_entity_type_change;
use crate::repo::customers::{self, CustomerNew};
use crate::repo::{parse_id, parse_opt_id, DeletedFilter};
use leadkeep_core::domain::{
    BusinessId, Customer, CustomerStatus, EntityType, Lead, LeadId, LeadSource, LeadStatus, Owner,
    ServiceId, UserId,
};
use leadkeep_core::rules::{can_be_converted, is_converted};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use tracing::{debug, info};

const LEAD_COLUMNS: &str = "id, name, entity_type, email, phone, company, source, status, notes, \
     assigned_to, business_id, service_id, created_at, updated_at, deleted_at";

#[derive(Debug, Clone)]
pub struct LeadNew {
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
}

/// Absent fields are left alone; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub entity_type: Option<EntityType>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub notes: Option<Option<String>>,
    pub assigned_to: Option<Option<UserId>>,
    pub business_id: Option<Option<BusinessId>>,
    pub service_id: Option<Option<ServiceId>>,
}

impl LeadUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.entity_type.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.source.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.assigned_to.is_none()
            && self.business_id.is_none()
            && self.service_id.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeadListOptions {
    pub status: Option<LeadStatus>,
    pub deleted: DeletedFilter,
}

pub struct LeadsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> LeadsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: LeadNew) -> Result<Lead> {
        let lead = Lead {
            id: LeadId::new(),
            name: input.name.trim().to_string(),
            entity_type: input.entity_type,
            email: input.email,
            phone: input.phone,
            company: input.company,
            source: input.source,
            status: input.status,
            notes: input.notes,
            assigned_to: input.assigned_to,
            business_id: input.business_id,
            service_id: input.service_id,
            created_at: now_utc,
            updated_at: now_utc,
            deleted_at: None,
        };
        lead.validate()?;

        self.conn.execute(
            &format!(
                "INSERT INTO leads ({LEAD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);"
            ),
            params![
                lead.id.to_string(),
                lead.name,
                lead.entity_type.as_str(),
                lead.email,
                lead.phone,
                lead.company,
                lead.source.as_str(),
                lead.status.as_str(),
                lead.notes,
                lead.assigned_to.map(|id| id.to_string()),
                lead.business_id.map(|id| id.to_string()),
                lead.service_id.map(|id| id.to_string()),
                lead.created_at,
                lead.updated_at,
                lead.deleted_at,
            ],
        )?;
        debug!(lead = %lead.id, "lead created");
        Ok(lead)
    }

    /// Live leads only.
    pub fn get(&self, id: LeadId) -> Result<Option<Lead>> {
        Ok(get_inner(self.conn, id)?.filter(|lead| !lead.is_deleted()))
    }

    pub fn get_with_deleted(&self, id: LeadId) -> Result<Option<Lead>> {
        get_inner(self.conn, id)
    }

    pub fn update(&self, now_utc: i64, id: LeadId, update: LeadUpdate) -> Result<Lead> {
        in_transaction(self.conn, |conn| update_inner(conn, now_utc, id, update))
    }

    pub fn list(&self, options: &LeadListOptions) -> Result<Vec<Lead>> {
        let mut sql = format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE {}",
            options.deleted.sql()
        );
        if options.status.is_some() {
            sql.push_str(" AND status = ?1");
        }
        sql.push_str(" ORDER BY updated_at DESC, name COLLATE NOCASE ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match options.status {
            Some(status) => stmt.query([status.as_str()])?,
            None => stmt.query([])?,
        };
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(lead_from_row(row)?);
        }
        Ok(leads)
    }

    /// Soft-deletes the lead after removing its contact persons and
    /// follow-ups, all in one transaction.
    pub fn delete(&self, now_utc: i64, id: LeadId) -> Result<CascadeSummary> {
        cascade::delete_owner_cascade(self.conn, now_utc, Owner::Lead(id))
    }

    pub fn restore(&self, now_utc: i64, id: LeadId) -> Result<Lead> {
        in_transaction(self.conn, |conn| {
            let mut lead =
                get_inner(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            if lead.deleted_at.is_some() {
                conn.execute(
                    "UPDATE leads SET deleted_at = NULL, updated_at = ?2 WHERE id = ?1;",
                    params![id.to_string(), now_utc],
                )?;
                lead.deleted_at = None;
                lead.updated_at = now_utc;
            }
            Ok(lead)
        })
    }

    /// Removes the row for good, dependents first.
    pub fn purge(&self, id: LeadId) -> Result<CascadeSummary> {
        cascade::purge_owner(self.conn, Owner::Lead(id))
    }

    /// The live customer created from this lead, if any.
    pub fn converted_customer(&self, id: LeadId) -> Result<Option<Customer>> {
        customers::get_by_converted_lead(self.conn, id)
    }

    pub fn can_be_converted(&self, id: LeadId) -> Result<bool> {
        let (lead, has_customer) = conversion_state(self.conn, id)?;
        Ok(can_be_converted(lead.status, has_customer))
    }

    pub fn is_converted(&self, id: LeadId) -> Result<bool> {
        let (lead, has_customer) = conversion_state(self.conn, id)?;
        Ok(is_converted(lead.status, has_customer))
    }

    /// Creates the customer for a won, unconverted lead. The lead itself is
    /// not modified.
    pub fn convert(&self, now_utc: i64, id: LeadId) -> Result<Customer> {
        in_immediate_transaction(self.conn, |conn| {
            let lead = get_inner(conn, id)?
                .filter(|lead| !lead.is_deleted())
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let has_customer = customers::get_by_converted_lead(conn, id)?.is_some();
            if !can_be_converted(lead.status, has_customer) {
                let reason = if has_customer {
                    format!("{} already converted", id)
                } else {
                    format!("{} has status {}", id, lead.status.as_str())
                };
                return Err(StoreError::NotConvertible(reason));
            }

            let customer = customers::create_inner(
                conn,
                now_utc,
                CustomerNew {
                    name: lead.name,
                    entity_type: lead.entity_type,
                    email: lead.email,
                    phone: lead.phone,
                    company: lead.company,
                    status: CustomerStatus::Active,
                    notes: None,
                    assigned_to: lead.assigned_to,
                    business_id: lead.business_id,
                    service_id: lead.service_id,
                    converted_from_lead_id: Some(id),
                },
            )?;
            info!(lead = %id, customer = %customer.id, "lead converted");
            Ok(customer)
        })
    }
}

fn conversion_state(conn: &Connection, id: LeadId) -> Result<(Lead, bool)> {
    let lead = get_inner(conn, id)?
        .filter(|lead| !lead.is_deleted())
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    let has_customer = customers::get_by_converted_lead(conn, id)?.is_some();
    Ok((lead, has_customer))
}

fn update_inner(conn: &Connection, now_utc: i64, id: LeadId, update: LeadUpdate) -> Result<Lead> {
    let mut lead = get_inner(conn, id)?
        .filter(|lead| !lead.is_deleted())
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    if let Some(value) = update.name {
        lead.name = value.trim().to_string();
    }
    if let Some(value) = update.entity_type {
        ensure_entity_type_change(conn, &Owner::Lead(id), lead.entity_type, value)?;
        lead.entity_type = value;
    }
    if let Some(value) = update.email {
        lead.email = value;
    }
    if let Some(value) = update.phone {
        lead.phone = value;
    }
    if let Some(value) = update.company {
        lead.company = value;
    }
    if let Some(value) = update.source {
        lead.source = value;
    }
    if let Some(value) = update.status {
        lead.status = value;
    }
    if let Some(value) = update.notes {
        lead.notes = value;
    }
    if let Some(value) = update.assigned_to {
        lead.assigned_to = value;
    }
    if let Some(value) = update.business_id {
        lead.business_id = value;
    }
    if let Some(value) = update.service_id {
        lead.service_id = value;
    }

    lead.updated_at = now_utc;
    lead.validate()?;

    conn.execute(
        "UPDATE leads SET name = ?2, entity_type = ?3, email = ?4, phone = ?5, company = ?6,
             source = ?7, status = ?8, notes = ?9, assigned_to = ?10, business_id = ?11,
             service_id = ?12, updated_at = ?13
         WHERE id = ?1;",
        params![
            lead.id.to_string(),
            lead.name,
            lead.entity_type.as_str(),
            lead.email,
            lead.phone,
            lead.company,
            lead.source.as_str(),
            lead.status.as_str(),
            lead.notes,
            lead.assigned_to.map(|id| id.to_string()),
            lead.business_id.map(|id| id.to_string()),
            lead.service_id.map(|id| id.to_string()),
            lead.updated_at,
        ],
    )?;
    Ok(lead)
}

fn get_inner(conn: &Connection, id: LeadId) -> Result<Option<Lead>> {
    conn.query_row(
        &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(lead_from_row(row)),
    )
    .optional()?
    .transpose()
}

fn lead_from_row(row: &rusqlite::Row<'_>) -> Result<Lead> {
    let entity_type: String = row.get(2)?;
    let source: String = row.get(6)?;
    let status: String = row.get(7)?;
    Ok(Lead {
        id: parse_id(row.get(0)?)?,
        name: row.get(1)?,
        entity_type: EntityType::from_str(&entity_type)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        company: row.get(5)?,
        source: LeadSource::from_str(&source)?,
        status: LeadStatus::from_str(&status)?,
        notes: row.get(8)?,
        assigned_to: parse_opt_id(row.get(9)?)?,
        business_id: parse_opt_id(row.get(10)?)?,
        service_id: parse_opt_id(row.get(11)?)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        deleted_at: row.get(14)?,
    })
}
