use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use leadkeep_core::dto::{FollowUpItemDto, ReminderOutputDto};
use leadkeep_core::rules::{compute_due_state, due_bounds, validate_soon_days};
use leadkeep_core::time::{format_timestamp_datetime, local_offset, now_utc};
use tracing::debug;

#[derive(Debug, Args)]
pub struct RemindArgs {
    #[arg(long)]
    pub soon_days: Option<i64>,
}

pub fn remind(ctx: &Context<'_>, args: RemindArgs) -> Result<()> {
    let soon_days = validate_soon_days(args.soon_days.unwrap_or(ctx.config.due_soon_days))?;
    let now = now_utc();
    let offset = local_offset();
    let bounds = due_bounds(now, soon_days, offset);

    let pending = ctx
        .store
        .follow_ups()
        .list_pending_due_before(bounds.soon_end)?;
    debug!(count = pending.len(), soon_days, "pending follow-ups loaded");

    let items = pending
        .into_iter()
        .map(|item| FollowUpItemDto {
            id: item.follow_up.id,
            owner: item.follow_up.owner,
            owner_name: item.owner_name,
            due_at: item.follow_up.due_at,
            due_state: compute_due_state(now, item.follow_up.due_at, soon_days, offset),
            status: item.follow_up.status,
            notes: item.follow_up.notes,
        })
        .collect();
    let output = ReminderOutputDto::from_items(items);

    if ctx.json {
        print_json(&output)?;
    } else {
        print_human(&output);
    }
    Ok(())
}

fn print_human(output: &ReminderOutputDto) {
    if output.is_empty() {
        println!("no reminders");
        return;
    }

    print_bucket("overdue", &output.overdue);
    print_bucket("today", &output.today);
    print_bucket("soon", &output.soon);
}

fn print_bucket(label: &str, items: &[FollowUpItemDto]) {
    if items.is_empty() {
        return;
    }

    println!("{label}:");
    for item in items {
        let notes = item
            .notes
            .as_deref()
            .map(|notes| format!("  {}", notes))
            .unwrap_or_default();
        println!(
            "  {}  {}  {}{}",
            format_timestamp_datetime(item.due_at),
            item.owner_name,
            item.owner,
            notes
        );
    }
}
