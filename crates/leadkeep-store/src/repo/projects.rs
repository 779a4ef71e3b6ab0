use crate::error::{Result, StoreError};
use crate::repo::{live_owner_entity_type, parse_id};
use leadkeep_core::domain::{CustomerId, Owner, Project, ProjectId};
use rusqlite::{params, Connection};

#[derive(Debug, Clone)]
pub struct ProjectNew {
    pub name: String,
    pub description: Option<String>,
}

pub struct ProjectsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ProjectsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, customer_id: CustomerId, input: ProjectNew) -> Result<Project> {
        live_owner_entity_type(self.conn, &Owner::Customer(customer_id))?;
        let project = Project {
            id: ProjectId::new(),
            customer_id,
            name: input.name.trim().to_string(),
            description: input.description,
            created_at: now_utc,
            updated_at: now_utc,
        };
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (id, customer_id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                project.id.to_string(),
                project.customer_id.to_string(),
                project.name,
                project.description,
                project.created_at,
                project.updated_at,
            ],
        )?;
        Ok(project)
    }

    pub fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, customer_id, name, description, created_at, updated_at
             FROM projects
             WHERE customer_id = ?1
             ORDER BY created_at ASC, name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([customer_id.to_string()])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(Project {
                id: parse_id(row.get(0)?)?,
                customer_id: parse_id(row.get(1)?)?,
                name: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            });
        }
        Ok(projects)
    }

    pub fn delete(&self, id: ProjectId) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
