use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{normalize_optional_value, parse_id, parse_owner};
use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use leadkeep_core::domain::ContactPersonId;
use leadkeep_core::time::now_utc;
use leadkeep_store::repo::{ContactDeleteOptions, ContactPersonNew, ContactPersonUpdate};

#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Attach a contact person to a business lead or customer
    Add(AddContactArgs),
    Edit(EditContactArgs),
    Rm(ContactIdArgs),
    /// Make a contact person the owner's primary contact
    Primary(ContactIdArgs),
    Ls(ListContactsArgs),
}

#[derive(Debug, Args)]
pub struct AddContactArgs {
    /// Owner as lead:<id> or customer:<id>
    pub owner: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub designation: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub primary: bool,
}

#[derive(Debug, Args)]
pub struct EditContactArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub designation: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub primary: bool,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "primary")]
    pub no_primary: bool,
}

#[derive(Debug, Args)]
pub struct ContactIdArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListContactsArgs {
    pub owner: String,
}

pub fn run(ctx: &Context<'_>, command: ContactCommand) -> Result<()> {
    match command {
        ContactCommand::Add(args) => add_contact(ctx, args),
        ContactCommand::Edit(args) => edit_contact(ctx, args),
        ContactCommand::Rm(args) => remove_contact(ctx, args),
        ContactCommand::Primary(args) => set_primary(ctx, args),
        ContactCommand::Ls(args) => list_contacts(ctx, args),
    }
}

fn add_contact(ctx: &Context<'_>, args: AddContactArgs) -> Result<()> {
    let owner = parse_owner(&args.owner)?;
    let contact = ctx.store.contact_persons().add(
        now_utc(),
        owner,
        ContactPersonNew {
            name: args.name,
            email: args.email.and_then(normalize_optional_value),
            mobile: args.mobile.and_then(normalize_optional_value),
            designation: args.designation.and_then(normalize_optional_value),
            is_primary: args.primary,
        },
    )?;

    if ctx.json {
        print_json(&contact)?;
    } else {
        println!("added contact {} {} to {}", contact.id, contact.name, owner);
    }
    Ok(())
}

fn edit_contact(ctx: &Context<'_>, args: EditContactArgs) -> Result<()> {
    let id: ContactPersonId = parse_id(&args.id, "contact")?;

    let mut update = ContactPersonUpdate {
        name: args.name,
        ..Default::default()
    };
    if let Some(email) = args.email {
        update.email = Some(normalize_optional_value(email));
    }
    if let Some(mobile) = args.mobile {
        update.mobile = Some(normalize_optional_value(mobile));
    }
    if let Some(designation) = args.designation {
        update.designation = Some(normalize_optional_value(designation));
    }
    if args.primary {
        update.is_primary = Some(true);
    } else if args.no_primary {
        update.is_primary = Some(false);
    }

    if update.is_empty() {
        return Err(invalid_input("no updates provided"));
    }

    let contact = ctx.store.contact_persons().update(now_utc(), id, update)?;
    if ctx.json {
        print_json(&contact)?;
    } else {
        println!("updated contact {} {}", contact.id, contact.name);
    }
    Ok(())
}

fn remove_contact(ctx: &Context<'_>, args: ContactIdArgs) -> Result<()> {
    let id: ContactPersonId = parse_id(&args.id, "contact")?;
    let options = ContactDeleteOptions {
        keep_last_contact: ctx.config.contacts.keep_last_contact,
    };
    ctx.store.contact_persons().delete(id, options)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("removed contact {}", id);
    }
    Ok(())
}

fn set_primary(ctx: &Context<'_>, args: ContactIdArgs) -> Result<()> {
    let id: ContactPersonId = parse_id(&args.id, "contact")?;
    let contact = ctx.store.contact_persons().set_primary(now_utc(), id)?;
    if ctx.json {
        print_json(&contact)?;
    } else {
        println!("{} is now the primary contact of {}", contact.name, contact.owner);
    }
    Ok(())
}

fn list_contacts(ctx: &Context<'_>, args: ListContactsArgs) -> Result<()> {
    let owner = parse_owner(&args.owner)?;
    let contacts = ctx.store.contact_persons().list_for_owner(owner)?;

    if ctx.json {
        print_json(&contacts)?;
        return Ok(());
    }

    if contacts.is_empty() {
        println!("no contacts");
        return Ok(());
    }

    for contact in contacts {
        let mut line = format!("{}  {}", contact.id, contact.name);
        if let Some(designation) = contact.designation.as_deref() {
            line.push_str(&format!(" ({})", designation));
        }
        if let Some(email) = contact.email.as_deref() {
            line.push_str(&format!("  {}", email));
        }
        if let Some(mobile) = contact.mobile.as_deref() {
            line.push_str(&format!("  {}", mobile));
        }
        if contact.is_primary {
            line.push_str("  [primary]");
        }
        println!("{}", line);
    }
    Ok(())
}
