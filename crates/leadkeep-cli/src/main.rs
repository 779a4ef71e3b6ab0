mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{contacts, customers, follow_ups, leads, projects, remind, Context};
use crate::error::{exit_code_for, report_error};
use crate::util::parse_id;
use leadkeep_config as config;
use leadkeep_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "leadkeep", version, about = "leadkeep CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// User id recorded on follow-up writes
    #[arg(long, global = true, value_name = "USER_ID")]
    actor: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Lead(leads::LeadCommand),
    #[command(subcommand)]
    Customer(customers::CustomerCommand),
    #[command(subcommand)]
    Contact(contacts::ContactCommand),
    #[command(subcommand)]
    Followup(follow_ups::FollowUpCommand),
    #[command(subcommand)]
    Project(projects::ProjectCommand),
    /// Pending follow-ups that are overdue, due today or due soon
    Remind(remind::RemindArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        actor,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
            Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
            Err(err) => debug!(error = %err, "config unavailable"),
        }
    }

    let actor = match actor {
        Some(raw) => Some(parse_id(&raw, "actor")?),
        None => app_config.default_actor,
    };

    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store = Store::open(&db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
        actor,
    };

    match command {
        Command::Lead(cmd) => leads::run(&ctx, cmd),
        Command::Customer(cmd) => customers::run(&ctx, cmd),
        Command::Contact(cmd) => contacts::run(&ctx, cmd),
        Command::Followup(cmd) => follow_ups::run(&ctx, cmd),
        Command::Project(cmd) => projects::run(&ctx, cmd),
        Command::Remind(args) => remind::remind(&ctx, args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
