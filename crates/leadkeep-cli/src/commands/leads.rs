use crate::commands::{print_cascade, print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{deleted_filter, normalize_optional_value, optional_id, parse_id, parse_opt};
use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use leadkeep_core::domain::{EntityType, Lead, LeadId, LeadSource, LeadStatus, Owner};
use leadkeep_core::dto::LeadDetailDto;
use leadkeep_core::rules::{can_be_converted, is_converted};
use leadkeep_core::time::{format_timestamp_date, format_timestamp_datetime, now_utc};
use leadkeep_store::repo::{LeadListOptions, LeadNew, LeadUpdate};
use std::str::FromStr;

#[derive(Debug, Subcommand)]
pub enum LeadCommand {
    Add(AddLeadArgs),
    Edit(EditLeadArgs),
    Show(LeadIdArgs),
    List(ListLeadsArgs),
    /// Soft-delete a lead and remove its contacts and follow-ups
    Delete(LeadIdArgs),
    Restore(LeadIdArgs),
    /// Permanently remove a lead
    Purge(LeadIdArgs),
    /// Create a customer from a won lead
    Convert(LeadIdArgs),
}

#[derive(Debug, Args)]
pub struct AddLeadArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, value_name = "TYPE", default_value = "individual")]
    pub entity_type: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long, default_value = "other")]
    pub source: String,
    #[arg(long, default_value = "new")]
    pub status: String,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, value_name = "USER_ID")]
    pub assigned_to: Option<String>,
    #[arg(long)]
    pub business_id: Option<String>,
    #[arg(long)]
    pub service_id: Option<String>,
}

/// Passing an empty string clears an optional field.
#[derive(Debug, Args)]
pub struct EditLeadArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, value_name = "TYPE")]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, value_name = "USER_ID")]
    pub assigned_to: Option<String>,
    #[arg(long)]
    pub business_id: Option<String>,
    #[arg(long)]
    pub service_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct LeadIdArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListLeadsArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub include_deleted: bool,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "include_deleted")]
    pub only_deleted: bool,
}

pub fn run(ctx: &Context<'_>, command: LeadCommand) -> Result<()> {
    match command {
        LeadCommand::Add(args) => add_lead(ctx, args),
        LeadCommand::Edit(args) => edit_lead(ctx, args),
        LeadCommand::Show(args) => show_lead(ctx, args),
        LeadCommand::List(args) => list_leads(ctx, args),
        LeadCommand::Delete(args) => delete_lead(ctx, args),
        LeadCommand::Restore(args) => restore_lead(ctx, args),
        LeadCommand::Purge(args) => purge_lead(ctx, args),
        LeadCommand::Convert(args) => convert_lead(ctx, args),
    }
}

fn add_lead(ctx: &Context<'_>, args: AddLeadArgs) -> Result<()> {
    let lead = ctx.store.leads().create(
        now_utc(),
        LeadNew {
            name: args.name,
            entity_type: EntityType::from_str(&args.entity_type)?,
            email: args.email.and_then(normalize_optional_value),
            phone: args.phone.and_then(normalize_optional_value),
            company: args.company.and_then(normalize_optional_value),
            source: LeadSource::from_str(&args.source)?,
            status: LeadStatus::from_str(&args.status)?,
            notes: args.notes.and_then(normalize_optional_value),
            assigned_to: args
                .assigned_to
                .map(|raw| parse_id(&raw, "user"))
                .transpose()?,
            business_id: args
                .business_id
                .map(|raw| parse_id(&raw, "business"))
                .transpose()?,
            service_id: args
                .service_id
                .map(|raw| parse_id(&raw, "service"))
                .transpose()?,
        },
    )?;

    if ctx.json {
        print_json(&lead)?;
    } else {
        println!("created lead {} {}", lead.id, lead.name);
    }
    Ok(())
}

fn edit_lead(ctx: &Context<'_>, args: EditLeadArgs) -> Result<()> {
    let id: LeadId = parse_id(&args.id, "lead")?;

    let mut update = LeadUpdate {
        name: args.name,
        entity_type: parse_opt(args.entity_type)?,
        source: parse_opt(args.source)?,
        status: parse_opt(args.status)?,
        ..Default::default()
    };
    if let Some(email) = args.email {
        update.email = Some(normalize_optional_value(email));
    }
    if let Some(phone) = args.phone {
        update.phone = Some(normalize_optional_value(phone));
    }
    if let Some(company) = args.company {
        update.company = Some(normalize_optional_value(company));
    }
    if let Some(notes) = args.notes {
        update.notes = Some(normalize_optional_value(notes));
    }
    if let Some(raw) = args.assigned_to {
        update.assigned_to = Some(optional_id(raw, "user")?);
    }
    if let Some(raw) = args.business_id {
        update.business_id = Some(optional_id(raw, "business")?);
    }
    if let Some(raw) = args.service_id {
        update.service_id = Some(optional_id(raw, "service")?);
    }

    if update.is_empty() {
        return Err(invalid_input("no updates provided"));
    }

    let lead = ctx.store.leads().update(now_utc(), id, update)?;
    if ctx.json {
        print_json(&lead)?;
    } else {
        println!("updated lead {} {}", lead.id, lead.name);
    }
    Ok(())
}

fn show_lead(ctx: &Context<'_>, args: LeadIdArgs) -> Result<()> {
    let id: LeadId = parse_id(&args.id, "lead")?;
    let lead = ctx
        .store
        .leads()
        .get(id)?
        .ok_or_else(|| not_found("lead not found"))?;
    let customer = ctx.store.leads().converted_customer(id)?;
    let has_customer = customer.is_some();
    let owner = Owner::Lead(id);

    let detail = LeadDetailDto {
        can_be_converted: can_be_converted(lead.status, has_customer),
        is_converted: is_converted(lead.status, has_customer),
        customer_id: customer.map(|customer| customer.id),
        contacts: ctx.store.contact_persons().list_for_owner(owner)?,
        follow_ups: ctx.store.follow_ups().list_for_owner(owner)?,
        lead,
    };

    if ctx.json {
        print_json(&detail)?;
        return Ok(());
    }

    let lead = &detail.lead;
    println!("id: {}", lead.id);
    println!("name: {}", lead.name);
    println!("entity_type: {}", lead.entity_type.as_str());
    println!("status: {}", lead.status.as_str());
    println!("source: {}", lead.source.as_str());
    if let Some(email) = lead.email.as_deref() {
        println!("email: {}", email);
    }
    if let Some(phone) = lead.phone.as_deref() {
        println!("phone: {}", phone);
    }
    if let Some(company) = lead.company.as_deref() {
        println!("company: {}", company);
    }
    if let Some(assigned_to) = lead.assigned_to {
        println!("assigned_to: {}", assigned_to);
    }
    if let Some(notes) = lead.notes.as_deref() {
        println!("notes: {}", notes);
    }
    println!("created_at: {}", format_timestamp_datetime(lead.created_at));
    println!("updated_at: {}", format_timestamp_datetime(lead.updated_at));
    match detail.customer_id {
        Some(customer_id) => println!("customer: {}", customer_id),
        None if detail.can_be_converted => println!("customer: none (ready to convert)"),
        None => println!("customer: none"),
    }

    if detail.contacts.is_empty() {
        println!("contacts: none");
    } else {
        println!("contacts:");
        for contact in &detail.contacts {
            let marker = if contact.is_primary { " (primary)" } else { "" };
            println!("  {}  {}{}", contact.id, contact.name, marker);
        }
    }

    if detail.follow_ups.is_empty() {
        println!("follow-ups: none");
    } else {
        println!("follow-ups:");
        for follow_up in &detail.follow_ups {
            println!(
                "  {}  {}  [{}]",
                follow_up.id,
                format_timestamp_datetime(follow_up.due_at),
                follow_up.status.as_str()
            );
        }
    }
    Ok(())
}

fn list_leads(ctx: &Context<'_>, args: ListLeadsArgs) -> Result<()> {
    let options = LeadListOptions {
        status: parse_opt(args.status)?,
        deleted: deleted_filter(args.include_deleted, args.only_deleted),
    };
    let leads = ctx.store.leads().list(&options)?;

    if ctx.json {
        print_json(&leads)?;
        return Ok(());
    }

    if leads.is_empty() {
        println!("no leads");
        return Ok(());
    }

    for lead in leads {
        print_lead_line(&lead);
    }
    Ok(())
}

fn print_lead_line(lead: &Lead) {
    let deleted = lead
        .deleted_at
        .map(|ts| format!("  deleted {}", format_timestamp_date(ts)))
        .unwrap_or_default();
    println!(
        "{}  {}  [{}]  {}{}",
        lead.id,
        lead.name,
        lead.status.as_str(),
        lead.entity_type.as_str(),
        deleted
    );
}

fn delete_lead(ctx: &Context<'_>, args: LeadIdArgs) -> Result<()> {
    let id: LeadId = parse_id(&args.id, "lead")?;
    let summary = ctx.store.leads().delete(now_utc(), id)?;
    print_cascade(ctx, "deleted", Owner::Lead(id), summary)
}

fn restore_lead(ctx: &Context<'_>, args: LeadIdArgs) -> Result<()> {
    let id: LeadId = parse_id(&args.id, "lead")?;
    let lead = ctx.store.leads().restore(now_utc(), id)?;
    if ctx.json {
        print_json(&lead)?;
    } else {
        println!("restored lead {} {}", lead.id, lead.name);
    }
    Ok(())
}

fn purge_lead(ctx: &Context<'_>, args: LeadIdArgs) -> Result<()> {
    let id: LeadId = parse_id(&args.id, "lead")?;
    let summary = ctx.store.leads().purge(id)?;
    print_cascade(ctx, "purged", Owner::Lead(id), summary)
}

fn convert_lead(ctx: &Context<'_>, args: LeadIdArgs) -> Result<()> {
    let id: LeadId = parse_id(&args.id, "lead")?;
    let customer = ctx.store.leads().convert(now_utc(), id)?;
    if ctx.json {
        print_json(&customer)?;
    } else {
        println!("converted lead {} into customer {}", id, customer.id);
    }
    Ok(())
}
