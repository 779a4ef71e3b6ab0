use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{normalize_optional_value, parse_id, parse_opt, parse_owner};
use anyhow::Result;
use clap::{Args, Subcommand};
use leadkeep_core::domain::{FollowUp, FollowUpId};
use leadkeep_core::time::{format_timestamp_datetime, now_utc, parse_local_timestamp};
use leadkeep_store::repo::{FollowUpNew, FollowUpUpdate};

#[derive(Debug, Subcommand)]
pub enum FollowUpCommand {
    /// Schedule a follow-up on a lead or customer
    Add(AddFollowUpArgs),
    Edit(EditFollowUpArgs),
    /// Mark a follow-up completed by the current actor
    Done(FollowUpIdArgs),
    Cancel(FollowUpIdArgs),
    Rm(FollowUpIdArgs),
    Ls(ListFollowUpsArgs),
}

#[derive(Debug, Args)]
pub struct AddFollowUpArgs {
    /// Owner as lead:<id> or customer:<id>
    pub owner: String,
    /// Local date or date-time, e.g. 2030-01-15 or "2030-01-15 09:30"
    #[arg(long, value_name = "WHEN")]
    pub due: String,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditFollowUpArgs {
    pub id: String,
    #[arg(long, value_name = "WHEN")]
    pub due: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Args)]
pub struct FollowUpIdArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListFollowUpsArgs {
    pub owner: String,
}

pub fn run(ctx: &Context<'_>, command: FollowUpCommand) -> Result<()> {
    match command {
        FollowUpCommand::Add(args) => add_follow_up(ctx, args),
        FollowUpCommand::Edit(args) => edit_follow_up(ctx, args),
        FollowUpCommand::Done(args) => complete_follow_up(ctx, args),
        FollowUpCommand::Cancel(args) => cancel_follow_up(ctx, args),
        FollowUpCommand::Rm(args) => remove_follow_up(ctx, args),
        FollowUpCommand::Ls(args) => list_follow_ups(ctx, args),
    }
}

fn add_follow_up(ctx: &Context<'_>, args: AddFollowUpArgs) -> Result<()> {
    let owner = parse_owner(&args.owner)?;
    let actor = ctx.require_actor()?;
    let due_at = parse_local_timestamp(&args.due)?;
    let follow_up = ctx.store.follow_ups().add(
        now_utc(),
        owner,
        FollowUpNew {
            due_at,
            notes: args.notes.and_then(normalize_optional_value),
            status: None,
        },
        actor,
    )?;

    if ctx.json {
        print_json(&follow_up)?;
    } else {
        println!(
            "scheduled follow-up {} for {} at {}",
            follow_up.id,
            owner,
            format_timestamp_datetime(follow_up.due_at)
        );
    }
    Ok(())
}

fn edit_follow_up(ctx: &Context<'_>, args: EditFollowUpArgs) -> Result<()> {
    let id: FollowUpId = parse_id(&args.id, "follow-up")?;
    let mut update = FollowUpUpdate {
        status: parse_opt(args.status)?,
        ..Default::default()
    };
    if let Some(raw) = args.due {
        update.due_at = Some(parse_local_timestamp(&raw)?);
    }
    if let Some(notes) = args.notes {
        update.notes = Some(normalize_optional_value(notes));
    }

    if update.is_empty() {
        return Err(invalid_input("no updates provided"));
    }

    let follow_up = ctx.store.follow_ups().update(now_utc(), id, update)?;
    print_follow_up(ctx, "updated", &follow_up)
}

fn complete_follow_up(ctx: &Context<'_>, args: FollowUpIdArgs) -> Result<()> {
    let id: FollowUpId = parse_id(&args.id, "follow-up")?;
    let actor = ctx.require_actor()?;
    let follow_up = ctx.store.follow_ups().mark_completed(now_utc(), id, actor)?;
    print_follow_up(ctx, "completed", &follow_up)
}

fn cancel_follow_up(ctx: &Context<'_>, args: FollowUpIdArgs) -> Result<()> {
    let id: FollowUpId = parse_id(&args.id, "follow-up")?;
    let follow_up = ctx.store.follow_ups().mark_cancelled(now_utc(), id)?;
    print_follow_up(ctx, "cancelled", &follow_up)
}

fn remove_follow_up(ctx: &Context<'_>, args: FollowUpIdArgs) -> Result<()> {
    let id: FollowUpId = parse_id(&args.id, "follow-up")?;
    ctx.store.follow_ups().delete(id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("removed follow-up {}", id);
    }
    Ok(())
}

fn list_follow_ups(ctx: &Context<'_>, args: ListFollowUpsArgs) -> Result<()> {
    let owner = parse_owner(&args.owner)?;
    let follow_ups = ctx.store.follow_ups().list_for_owner(owner)?;

    if ctx.json {
        print_json(&follow_ups)?;
        return Ok(());
    }

    if follow_ups.is_empty() {
        println!("no follow-ups");
        return Ok(());
    }

    let now = now_utc();
    for follow_up in follow_ups {
        let overdue = if follow_up.is_overdue(now) {
            "  (overdue)"
        } else {
            ""
        };
        let notes = follow_up.notes.as_deref().unwrap_or("(no notes)");
        println!(
            "{}  {}  [{}]  {}{}",
            follow_up.id,
            format_timestamp_datetime(follow_up.due_at),
            follow_up.status.as_str(),
            notes,
            overdue
        );
    }
    Ok(())
}

fn print_follow_up(ctx: &Context<'_>, verb: &str, follow_up: &FollowUp) -> Result<()> {
    if ctx.json {
        print_json(follow_up)?;
    } else {
        println!("{} follow-up {}", verb, follow_up.id);
    }
    Ok(())
}
