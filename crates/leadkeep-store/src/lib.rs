pub mod cascade;
pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;

use crate::cascade::CascadeSummary;
use crate::error::Result;
use leadkeep_core::domain::Owner;
use rusqlite::Connection;
use std::path::Path;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn leads(&self) -> repo::LeadsRepo<'_> {
        repo::LeadsRepo::new(&self.conn)
    }

    pub fn customers(&self) -> repo::CustomersRepo<'_> {
        repo::CustomersRepo::new(&self.conn)
    }

    pub fn contact_persons(&self) -> repo::ContactPersonsRepo<'_> {
        repo::ContactPersonsRepo::new(&self.conn)
    }

    pub fn follow_ups(&self) -> repo::FollowUpsRepo<'_> {
        repo::FollowUpsRepo::new(&self.conn)
    }

    pub fn projects(&self) -> repo::ProjectsRepo<'_> {
        repo::ProjectsRepo::new(&self.conn)
    }

    /// Deletes a lead or customer together with everything it owns.
    pub fn delete_owner_cascade(&self, now_utc: i64, owner: Owner) -> Result<CascadeSummary> {
        cascade::delete_owner_cascade(&self.conn, now_utc, owner)
    }
}
