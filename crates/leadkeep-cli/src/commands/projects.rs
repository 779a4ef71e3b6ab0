use crate::commands::{print_json, Context};
use crate::util::{normalize_optional_value, parse_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use leadkeep_core::domain::{CustomerId, ProjectId};
use leadkeep_core::time::{format_timestamp_date, now_utc};
use leadkeep_store::repo::ProjectNew;

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    Add(AddProjectArgs),
    Ls(ListProjectsArgs),
    Rm(RemoveProjectArgs),
}

#[derive(Debug, Args)]
pub struct AddProjectArgs {
    pub customer_id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListProjectsArgs {
    pub customer_id: String,
}

#[derive(Debug, Args)]
pub struct RemoveProjectArgs {
    pub id: String,
}

pub fn run(ctx: &Context<'_>, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Add(args) => add_project(ctx, args),
        ProjectCommand::Ls(args) => list_projects(ctx, args),
        ProjectCommand::Rm(args) => remove_project(ctx, args),
    }
}

fn add_project(ctx: &Context<'_>, args: AddProjectArgs) -> Result<()> {
    let customer_id: CustomerId = parse_id(&args.customer_id, "customer")?;
    let project = ctx.store.projects().create(
        now_utc(),
        customer_id,
        ProjectNew {
            name: args.name,
            description: args.description.and_then(normalize_optional_value),
        },
    )?;

    if ctx.json {
        print_json(&project)?;
    } else {
        println!("created project {} {}", project.id, project.name);
    }
    Ok(())
}

fn list_projects(ctx: &Context<'_>, args: ListProjectsArgs) -> Result<()> {
    let customer_id: CustomerId = parse_id(&args.customer_id, "customer")?;
    let projects = ctx.store.projects().list_for_customer(customer_id)?;

    if ctx.json {
        print_json(&projects)?;
        return Ok(());
    }

    if projects.is_empty() {
        println!("no projects");
        return Ok(());
    }

    for project in projects {
        println!(
            "{}  {}  {}",
            project.id,
            project.name,
            format_timestamp_date(project.created_at)
        );
    }
    Ok(())
}

fn remove_project(ctx: &Context<'_>, args: RemoveProjectArgs) -> Result<()> {
    let id: ProjectId = parse_id(&args.id, "project")?;
    ctx.store.projects().delete(id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("removed project {}", id);
    }
    Ok(())
}
