use anyhow::Result;
use leadkeep_config::AppConfig;
use leadkeep_core::domain::{Owner, UserId};
use leadkeep_store::cascade::CascadeSummary;
use leadkeep_store::Store;
use serde::Serialize;
use std::io::{self, Write};

use crate::error::invalid_input;

pub mod contacts;
pub mod customers;
pub mod follow_ups;
pub mod leads;
pub mod projects;
pub mod remind;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
    pub actor: Option<UserId>,
}

impl Context<'_> {
    /// The user recorded on follow-up writes.
    pub fn require_actor(&self) -> Result<UserId> {
        self.actor
            .ok_or_else(|| invalid_input("no actor: pass --actor or set default_actor in config"))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct CascadeDto {
    owner: Owner,
    contact_persons: usize,
    follow_ups: usize,
    projects: usize,
}

/// Reports what a delete or purge removed along with `owner`.
pub fn print_cascade(
    ctx: &Context<'_>,
    verb: &str,
    owner: Owner,
    summary: CascadeSummary,
) -> Result<()> {
    if ctx.json {
        return print_json(&CascadeDto {
            owner,
            contact_persons: summary.contact_persons,
            follow_ups: summary.follow_ups,
            projects: summary.projects,
        });
    }
    println!(
        "{} {} ({} contacts, {} follow-ups, {} projects removed)",
        verb, owner, summary.contact_persons, summary.follow_ups, summary.projects
    );
    Ok(())
}
