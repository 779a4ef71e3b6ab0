use crate::cascade::{self, CascadeSummary};
use crate::db::in_transaction;
use crate::error::{map_unique_violation, Result, StoreError};
use crate::repo::contact_persons::ensure_entity_type_change;
use crate::repo::{parse_id, parse_opt_id, DeletedFilter};
use leadkeep_core::domain::{
    BusinessId, Customer, CustomerId, CustomerStatus, EntityType, LeadId, Owner, ServiceId, UserId,
};
use leadkeep_core::CoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use tracing::debug;

const CUSTOMER_COLUMNS: &str = "id, name, entity_type, email, phone, company, status, notes, \
     assigned_to, business_id, service_id, converted_from_lead_id, created_at, updated_at, \
     deleted_at";

#[derive(Debug, Clone)]
pub struct CustomerNew {
    pub name: String,
    pub entity_type: EntityType,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: CustomerStatus,
    pub notes: Option<String>,
    pub assigned_to: Option<UserId>,
    pub business_id: Option<BusinessId>,
    pub service_id: Option<ServiceId>,
    pub converted_from_lead_id: Option<LeadId>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub entity_type: Option<EntityType>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub status: Option<CustomerStatus>,
    pub notes: Option<Option<String>>,
    pub assigned_to: Option<Option<UserId>>,
    pub business_id: Option<Option<BusinessId>>,
    pub service_id: Option<Option<ServiceId>>,
    /// Fixed at creation. Only a no-op value is accepted.
    pub converted_from_lead_id: Option<Option<LeadId>>,
}

impl CustomerUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.entity_type.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.assigned_to.is_none()
            && self.business_id.is_none()
            && self.service_id.is_none()
            && self.converted_from_lead_id.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomerListOptions {
    pub status: Option<CustomerStatus>,
    pub deleted: DeletedFilter,
}

pub struct CustomersRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CustomersRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: CustomerNew) -> Result<Customer> {
        in_transaction(self.conn, |conn| create_inner(conn, now_utc, input))
    }

    pub fn get(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(get_inner(self.conn, id)?.filter(|customer| !customer.is_deleted()))
    }

    pub fn get_with_deleted(&self, id: CustomerId) -> Result<Option<Customer>> {
        get_inner(self.conn, id)
    }

    pub fn update(&self, now_utc: i64, id: CustomerId, update: CustomerUpdate) -> Result<Customer> {
        in_transaction(self.conn, |conn| update_inner(conn, now_utc, id, update))
    }

    pub fn list(&self, options: &CustomerListOptions) -> Result<Vec<Customer>> {
        let mut sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE {}",
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
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(customer_from_row(row)?);
        }
        Ok(customers)
    }

    /// Soft-deletes the customer after removing its contact persons,
    /// follow-ups and projects, all in one transaction.
    pub fn delete(&self, now_utc: i64, id: CustomerId) -> Result<CascadeSummary> {
        cascade::delete_owner_cascade(self.conn, now_utc, Owner::Customer(id))
    }

    /// Fails with `NotConvertible` if another live customer already claims the
    /// same source lead.
    pub fn restore(&self, now_utc: i64, id: CustomerId) -> Result<Customer> {
        in_transaction(self.conn, |conn| {
            let mut customer =
                get_inner(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            if customer.deleted_at.is_some() {
                conn.execute(
                    "UPDATE customers SET deleted_at = NULL, updated_at = ?2 WHERE id = ?1;",
                    params![id.to_string(), now_utc],
                )
                .map_err(|err| lead_claimed(err, customer.converted_from_lead_id))?;
                customer.deleted_at = None;
                customer.updated_at = now_utc;
            }
            Ok(customer)
        })
    }

    pub fn purge(&self, id: CustomerId) -> Result<CascadeSummary> {
        cascade::purge_owner(self.conn, Owner::Customer(id))
    }
}

pub(crate) fn create_inner(conn: &Connection, now_utc: i64, input: CustomerNew) -> Result<Customer> {
    let customer = Customer {
        id: CustomerId::new(),
        name: input.name.trim().to_string(),
        entity_type: input.entity_type,
        email: input.email,
        phone: input.phone,
        company: input.company,
        status: input.status,
        notes: input.notes,
        assigned_to: input.assigned_to,
        business_id: input.business_id,
        service_id: input.service_id,
        converted_from_lead_id: input.converted_from_lead_id,
        created_at: now_utc,
        updated_at: now_utc,
        deleted_at: None,
    };
    customer.validate()?;

    if let Some(lead_id) = customer.converted_from_lead_id {
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM leads WHERE id = ?1;",
                [lead_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::NotFound(lead_id.to_string()));
        }
    }

    conn.execute(
        &format!(
            "INSERT INTO customers ({CUSTOMER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);"
        ),
        params![
            customer.id.to_string(),
            customer.name,
            customer.entity_type.as_str(),
            customer.email,
            customer.phone,
            customer.company,
            customer.status.as_str(),
            customer.notes,
            customer.assigned_to.map(|id| id.to_string()),
            customer.business_id.map(|id| id.to_string()),
            customer.service_id.map(|id| id.to_string()),
            customer.converted_from_lead_id.map(|id| id.to_string()),
            customer.created_at,
            customer.updated_at,
            customer.deleted_at,
        ],
    )
    .map_err(|err| lead_claimed(err, customer.converted_from_lead_id))?;
    debug!(customer = %customer.id, "customer created");
    Ok(customer)
}

pub(crate) fn get_by_converted_lead(conn: &Connection, lead_id: LeadId) -> Result<Option<Customer>> {
    conn.query_row(
        &format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             WHERE converted_from_lead_id = ?1 AND deleted_at IS NULL;"
        ),
        [lead_id.to_string()],
        |row| Ok(customer_from_row(row)),
    )
    .optional()?
    .transpose()
}

fn lead_claimed(err: rusqlite::Error, lead_id: Option<LeadId>) -> StoreError {
    map_unique_violation(err, "customers.converted_from_lead_id", || {
        let lead = lead_id.map(|id| id.to_string()).unwrap_or_default();
        StoreError::NotConvertible(format!("{} already converted", lead))
    })
}

fn update_inner(
    conn: &Connection,
    now_utc: i64,
    id: CustomerId,
    update: CustomerUpdate,
) -> Result<Customer> {
    let mut customer = get_inner(conn, id)?
        .filter(|customer| !customer.is_deleted())
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    if let Some(value) = update.converted_from_lead_id {
        if value != customer.converted_from_lead_id {
            return Err(CoreError::ImmutableFieldAttempt("converted_from_lead_id").into());
        }
    }
    if let Some(value) = update.name {
        customer.name = value.trim().to_string();
    }
    if let Some(value) = update.entity_type {
        ensure_entity_type_change(conn, &Owner::Customer(id), customer.entity_type, value)?;
        customer.entity_type = value;
    }
    if let Some(value) = update.email {
        customer.email = value;
    }
    if let Some(value) = update.phone {
        customer.phone = value;
    }
    if let Some(value) = update.company {
        customer.company = value;
    }
    if let Some(value) = update.status {
        customer.status = value;
    }
    if let Some(value) = update.notes {
        customer.notes = value;
    }
    if let Some(value) = update.assigned_to {
        customer.assigned_to = value;
    }
    if let Some(value) = update.business_id {
        customer.business_id = value;
    }
    if let Some(value) = update.service_id {
        customer.service_id = value;
    }

    customer.updated_at = now_utc;
    customer.validate()?;

    conn.execute(
        "UPDATE customers SET name = ?2, entity_type = ?3, email = ?4, phone = ?5, company = ?6,
             status = ?7, notes = ?8, assigned_to = ?9, business_id = ?10, service_id = ?11,
             updated_at = ?12
         WHERE id = ?1;",
        params![
            customer.id.to_string(),
            customer.name,
            customer.entity_type.as_str(),
            customer.email,
            customer.phone,
            customer.company,
            customer.status.as_str(),
            customer.notes,
            customer.assigned_to.map(|id| id.to_string()),
            customer.business_id.map(|id| id.to_string()),
            customer.service_id.map(|id| id.to_string()),
            customer.updated_at,
        ],
    )?;
    Ok(customer)
}

fn get_inner(conn: &Connection, id: CustomerId) -> Result<Option<Customer>> {
    conn.query_row(
        &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(customer_from_row(row)),
    )
    .optional()?
    .transpose()
}

fn customer_from_row(row: &rusqlite::Row<'_>) -> Result<Customer> {
    let entity_type: String = row.get(2)?;
    let status: String = row.get(6)?;
    Ok(Customer {
        id: parse_id(row.get(0)?)?,
        name: row.get(1)?,
        entity_type: EntityType::from_str(&entity_type)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        company: row.get(5)?,
        status: CustomerStatus::from_str(&status)?,
        notes: row.get(7)?,
        assigned_to: parse_opt_id(row.get(8)?)?,
        business_id: parse_opt_id(row.get(9)?)?,
        service_id: parse_opt_id(row.get(10)?)?,
        converted_from_lead_id: parse_opt_id(row.get(11)?)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        deleted_at: row.get(14)?,
    })
}
