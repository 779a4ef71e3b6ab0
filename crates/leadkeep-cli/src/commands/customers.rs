use crate::commands::{print_cascade, print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{deleted_filter, normalize_optional_value, optional_id, parse_id, parse_opt};
use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use leadkeep_core::domain::{CustomerId, CustomerStatus, EntityType, Owner};
use leadkeep_core::dto::CustomerDetailDto;
use leadkeep_core::time::{format_timestamp_date, format_timestamp_datetime, now_utc};
use leadkeep_store::repo::{CustomerListOptions, CustomerNew, CustomerUpdate};
use std::str::FromStr;

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    Add(AddCustomerArgs),
    Edit(EditCustomerArgs),
    Show(CustomerIdArgs),
    List(ListCustomersArgs),
    /// Soft-delete a customer and remove its contacts, follow-ups and projects
    Delete(CustomerIdArgs),
    Restore(CustomerIdArgs),
    /// Permanently remove a customer
    Purge(CustomerIdArgs),
}

#[derive(Debug, Args)]
pub struct AddCustomerArgs {
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
    #[arg(long, default_value = "active")]
    pub status: String,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, value_name = "USER_ID")]
    pub assigned_to: Option<String>,
    #[arg(long)]
    pub business_id: Option<String>,
    #[arg(long)]
    pub service_id: Option<String>,
    /// Lead this customer was won from
    #[arg(long, value_name = "LEAD_ID")]
    pub from_lead: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditCustomerArgs {
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
    pub status: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, value_name = "USER_ID")]
    pub assigned_to: Option<String>,
    #[arg(long)]
    pub business_id: Option<String>,
    #[arg(long)]
    pub service_id: Option<String>,
    #[arg(long, value_name = "LEAD_ID")]
    pub from_lead: Option<String>,
}

#[derive(Debug, Args)]
pub struct CustomerIdArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListCustomersArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub include_deleted: bool,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "include_deleted")]
    pub only_deleted: bool,
}

pub fn run(ctx: &Context<'_>, command: CustomerCommand) -> Result<()> {
    match command {
        CustomerCommand::Add(args) => add_customer(ctx, args),
        CustomerCommand::Edit(args) => edit_customer(ctx, args),
        CustomerCommand::Show(args) => show_customer(ctx, args),
        CustomerCommand::List(args) => list_customers(ctx, args),
        CustomerCommand::Delete(args) => delete_customer(ctx, args),
        CustomerCommand::Restore(args) => restore_customer(ctx, args),
        CustomerCommand::Purge(args) => purge_customer(ctx, args),
    }
}

fn add_customer(ctx: &Context<'_>, args: AddCustomerArgs) -> Result<()> {
    let customer = ctx.store.customers().create(
        now_utc(),
        CustomerNew {
            name: args.name,
            entity_type: EntityType::from_str(&args.entity_type)?,
            email: args.email.and_then(normalize_optional_value),
            phone: args.phone.and_then(normalize_optional_value),
            company: args.company.and_then(normalize_optional_value),
            status: CustomerStatus::from_str(&args.status)?,
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
            converted_from_lead_id: args
                .from_lead
                .map(|raw| parse_id(&raw, "lead"))
                .transpose()?,
        },
    )?;

    if ctx.json {
        print_json(&customer)?;
    } else {
        println!("created customer {} {}", customer.id, customer.name);
    }
    Ok(())
}

fn edit_customer(ctx: &Context<'_>, args: EditCustomerArgs) -> Result<()> {
    let id: CustomerId = parse_id(&args.id, "customer")?;

    let mut update = CustomerUpdate {
        name: args.name,
        entity_type: parse_opt(args.entity_type)?,
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
    if let Some(raw) = args.from_lead {
        update.converted_from_lead_id = Some(optional_id(raw, "lead")?);
    }

    if update.is_empty() {
        return Err(invalid_input("no updates provided"));
    }

    let customer = ctx.store.customers().update(now_utc(), id, update)?;
    if ctx.json {
        print_json(&customer)?;
    } else {
        println!("updated customer {} {}", customer.id, customer.name);
    }
    Ok(())
}

fn show_customer(ctx: &Context<'_>, args: CustomerIdArgs) -> Result<()> {
    let id: CustomerId = parse_id(&args.id, "customer")?;
    let customer = ctx
        .store
        .customers()
        .get(id)?
        .ok_or_else(|| not_found("customer not found"))?;
    let owner = Owner::Customer(id);

    let detail = CustomerDetailDto {
        contacts: ctx.store.contact_persons().list_for_owner(owner)?,
        follow_ups: ctx.store.follow_ups().list_for_owner(owner)?,
        projects: ctx.store.projects().list_for_customer(id)?,
        customer,
    };

    if ctx.json {
        print_json(&detail)?;
        return Ok(());
    }

    let customer = &detail.customer;
    println!("id: {}", customer.id);
    println!("name: {}", customer.name);
    println!("entity_type: {}", customer.entity_type.as_str());
    println!("status: {}", customer.status.as_str());
    if let Some(email) = customer.email.as_deref() {
        println!("email: {}", email);
    }
    if let Some(phone) = customer.phone.as_deref() {
        println!("phone: {}", phone);
    }
    if let Some(company) = customer.company.as_deref() {
        println!("company: {}", company);
    }
    if let Some(lead_id) = customer.converted_from_lead_id {
        println!("converted_from_lead: {}", lead_id);
    }
    if let Some(notes) = customer.notes.as_deref() {
        println!("notes: {}", notes);
    }
    println!(
        "created_at: {}",
        format_timestamp_datetime(customer.created_at)
    );

    if detail.contacts.is_empty() {
        println!("contacts: none");
    } else {
        println!("contacts:");
        for contact in &detail.contacts {
            let marker = if contact.is_primary { " (primary)" } else { "" };
            println!("  {}  {}{}", contact.id, contact.name, marker);
        }
    }
    if !detail.follow_ups.is_empty() {
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
    if !detail.projects.is_empty() {
        println!("projects:");
        for project in &detail.projects {
            println!("  {}  {}", project.id, project.name);
        }
    }
    Ok(())
}

fn list_customers(ctx: &Context<'_>, args: ListCustomersArgs) -> Result<()> {
    let options = CustomerListOptions {
        status: parse_opt(args.status)?,
        deleted: deleted_filter(args.include_deleted, args.only_deleted),
    };
    let customers = ctx.store.customers().list(&options)?;

    if ctx.json {
        print_json(&customers)?;
        return Ok(());
    }

    if customers.is_empty() {
        println!("no customers");
        return Ok(());
    }

    for customer in customers {
        let deleted = customer
            .deleted_at
            .map(|ts| format!("  deleted {}", format_timestamp_date(ts)))
            .unwrap_or_default();
        println!(
            "{}  {}  [{}]  {}{}",
            customer.id,
            customer.name,
            customer.status.as_str(),
            customer.entity_type.as_str(),
            deleted
        );
    }
    Ok(())
}

fn delete_customer(ctx: &Context<'_>, args: CustomerIdArgs) -> Result<()> {
    let id: CustomerId = parse_id(&args.id, "customer")?;
    let summary = ctx.store.customers().delete(now_utc(), id)?;
    print_cascade(ctx, "deleted", Owner::Customer(id), summary)
}

fn restore_customer(ctx: &Context<'_>, args: CustomerIdArgs) -> Result<()> {
    let id: CustomerId = parse_id(&args.id, "customer")?;
    let customer = ctx.store.customers().restore(now_utc(), id)?;
    if ctx.json {
        print_json(&customer)?;
    } else {
        println!("restored customer {} {}", customer.id, customer.name);
    }
    Ok(())
}

fn purge_customer(ctx: &Context<'_>, args: CustomerIdArgs) -> Result<()> {
    let id: CustomerId = parse_id(&args.id, "customer")?;
    let summary = ctx.store.customers().purge(id)?;
    print_cascade(ctx, "purged", Owner::Customer(id), summary)
}
