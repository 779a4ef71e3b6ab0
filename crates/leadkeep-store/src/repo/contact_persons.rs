use crate::db::in_transaction;
use crate::error::{map_unique_violation, Result, StoreError};
use crate::repo::{live_owner_entity_type, owner_from_columns, parse_id};
use leadkeep_core::domain::{ContactPerson, ContactPersonId, EntityType, Owner};
use leadkeep_core::CoreError;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

const CONTACT_COLUMNS: &str = "id, owner_kind, owner_id, name, email, mobile, designation, \
     is_primary, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct ContactPersonNew {
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPersonUpdate {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub mobile: Option<Option<String>>,
    pub designation: Option<Option<String>>,
    pub is_primary: Option<bool>,
}

impl ContactPersonUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.mobile.is_none()
            && self.designation.is_none()
            && self.is_primary.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactDeleteOptions {
    /// Refuse to remove the last contact person of a business owner.
    pub keep_last_contact: bool,
}

/// Contact persons of business leads and customers. Every write keeps at most
/// one primary contact per owner.
pub struct ContactPersonsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ContactPersonsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Adds a contact, demoting the current primary first when the new one
    /// is primary.
    pub fn add(&self, now_utc: i64, owner: Owner, input: ContactPersonNew) -> Result<ContactPerson> {
        in_transaction(self.conn, |conn| {
            ensure_business_owner(conn, &owner)?;
            if input.is_primary {
                clear_primary(conn, now_utc, &owner)?;
            }
            insert(conn, now_utc, owner, input)
        })
    }

    /// Inserts exactly what it is given. A second primary is rejected with
    /// `MultiplePrimaryContacts` instead of demoting the existing one.
    pub fn insert_verbatim(
        &self,
        now_utc: i64,
        owner: Owner,
        input: ContactPersonNew,
    ) -> Result<ContactPerson> {
        in_transaction(self.conn, |conn| {
            ensure_business_owner(conn, &owner)?;
            insert(conn, now_utc, owner, input)
        })
    }

    pub fn update(
        &self,
        now_utc: i64,
        id: ContactPersonId,
        update: ContactPersonUpdate,
    ) -> Result<ContactPerson> {
        in_transaction(self.conn, |conn| update_inner(conn, now_utc, id, update))
    }

    pub fn set_primary(&self, now_utc: i64, id: ContactPersonId) -> Result<ContactPerson> {
        let update = ContactPersonUpdate {
            is_primary: Some(true),
            ..Default::default()
        };
        self.update(now_utc, id, update)
    }

    pub fn delete(&self, id: ContactPersonId, options: ContactDeleteOptions) -> Result<()> {
        in_transaction(self.conn, |conn| {
            let contact =
                get_inner(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            if options.keep_last_contact {
                let remaining = count_for_owner(conn, &contact.owner)?;
                let is_business = live_owner_entity_type(conn, &contact.owner)
                    .map(|entity_type| entity_type.is_business())
                    .unwrap_or(false);
                if remaining <= 1 && is_business {
                    return Err(CoreError::CannotDeleteOnlyContact.into());
                }
            }
            conn.execute("DELETE FROM contact_persons WHERE id = ?1;", [id.to_string()])?;
            debug!(contact = %id, owner = %contact.owner, "contact person deleted");
            Ok(())
        })
    }

    pub fn get(&self, id: ContactPersonId) -> Result<Option<ContactPerson>> {
        get_inner(self.conn, id)
    }

    /// Primary first, then by name.
    pub fn list_for_owner(&self, owner: Owner) -> Result<Vec<ContactPerson>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_persons
             WHERE owner_kind = ?1 AND owner_id = ?2
             ORDER BY is_primary DESC, name COLLATE NOCASE ASC, created_at ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.kind().as_str(), owner.id_string()])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(contact_from_row(row)?);
        }
        Ok(contacts)
    }

    pub fn primary_for_owner(&self, owner: Owner) -> Result<Option<ContactPerson>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {CONTACT_COLUMNS} FROM contact_persons
                     WHERE owner_kind = ?1 AND owner_id = ?2 AND is_primary = 1;"
                ),
                params![owner.kind().as_str(), owner.id_string()],
                |row| Ok(contact_from_row(row)),
            )
            .optional()?
            .transpose()
    }
}

fn ensure_business_owner(conn: &Connection, owner: &Owner) -> Result<()> {
    let entity_type = live_owner_entity_type(conn, owner)?;
    if !entity_type.is_business() {
        return Err(CoreError::InvalidOwnerType(entity_type).into());
    }
    Ok(())
}

/// Rejects turning a business owner that still has contact persons into an
/// individual.
pub(crate) fn ensure_entity_type_change(
    conn: &Connection,
    owner: &Owner,
    from: EntityType,
    to: EntityType,
) -> Result<()> {
    if from.is_business() && !to.is_business() && count_for_owner(conn, owner)? > 0 {
        return Err(CoreError::InvalidOwnerType(to).into());
    }
    Ok(())
}

fn clear_primary(conn: &Connection, now_utc: i64, owner: &Owner) -> Result<usize> {
    let cleared = conn.execute(
        "UPDATE contact_persons SET is_primary = 0, updated_at = ?3
         WHERE owner_kind = ?1 AND owner_id = ?2 AND is_primary = 1;",
        params![owner.kind().as_str(), owner.id_string(), now_utc],
    )?;
    Ok(cleared)
}

fn count_for_owner(conn: &Connection, owner: &Owner) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM contact_persons WHERE owner_kind = ?1 AND owner_id = ?2;",
        params![owner.kind().as_str(), owner.id_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn primary_conflict(err: rusqlite::Error) -> StoreError {
    map_unique_violation(err, "contact_persons.owner_kind", || {
        CoreError::MultiplePrimaryContacts.into()
    })
}

fn insert(
    conn: &Connection,
    now_utc: i64,
    owner: Owner,
    input: ContactPersonNew,
) -> Result<ContactPerson> {
    let contact = ContactPerson {
        id: ContactPersonId::new(),
        owner,
        name: input.name.trim().to_string(),
        email: input.email,
        mobile: input.mobile,
        designation: input.designation,
        is_primary: input.is_primary,
        created_at: now_utc,
        updated_at: now_utc,
    };
    contact.validate()?;

    conn.execute(
        &format!(
            "INSERT INTO contact_persons ({CONTACT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);"
        ),
        params![
            contact.id.to_string(),
            contact.owner.kind().as_str(),
            contact.owner.id_string(),
            contact.name,
            contact.email,
            contact.mobile,
            contact.designation,
            contact.is_primary,
            contact.created_at,
            contact.updated_at,
        ],
    )
    .map_err(primary_conflict)?;
    debug!(contact = %contact.id, owner = %contact.owner, primary = contact.is_primary, "contact person added");
    Ok(contact)
}

fn update_inner(
    conn: &Connection,
    now_utc: i64,
    id: ContactPersonId,
    update: ContactPersonUpdate,
) -> Result<ContactPerson> {
    let mut contact = get_inner(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    if let Some(value) = update.name {
        contact.name = value.trim().to_string();
    }
    if let Some(value) = update.email {
        contact.email = value;
    }
    if let Some(value) = update.mobile {
        contact.mobile = value;
    }
    if let Some(value) = update.designation {
        contact.designation = value;
    }
    if let Some(value) = update.is_primary {
        if value && !contact.is_primary {
            ensure_business_owner(conn, &contact.owner)?;
            clear_primary(conn, now_utc, &contact.owner)?;
        }
        contact.is_primary = value;
    }

    contact.updated_at = now_utc;
    contact.validate()?;

    conn.execute(
        "UPDATE contact_persons SET name = ?2, email = ?3, mobile = ?4, designation = ?5,
             is_primary = ?6, updated_at = ?7
         WHERE id = ?1;",
        params![
            contact.id.to_string(),
            contact.name,
            contact.email,
            contact.mobile,
            contact.designation,
            contact.is_primary,
            contact.updated_at,
        ],
    )
    .map_err(primary_conflict)?;
    Ok(contact)
}

fn get_inner(conn: &Connection, id: ContactPersonId) -> Result<Option<ContactPerson>> {
    conn.query_row(
        &format!("SELECT {CONTACT_COLUMNS} FROM contact_persons WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(contact_from_row(row)),
    )
    .optional()?
    .transpose()
}

fn contact_from_row(row: &rusqlite::Row<'_>) -> Result<ContactPerson> {
    let owner_kind: String = row.get(1)?;
    let owner_id: String = row.get(2)?;
    Ok(ContactPerson {
        id: parse_id(row.get(0)?)?,
        owner: owner_from_columns(&owner_kind, &owner_id)?,
        name: row.get(3)?,
        email: row.get(4)?,
        mobile: row.get(5)?,
        designation: row.get(6)?,
        is_primary: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
