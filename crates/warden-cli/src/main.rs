//! Warden CLI.
//!
//! Evaluates access decisions offline against a JSON state snapshot.
//!
//! # Quick Start
//!
//! ```bash
//! # Would alice be allowed to execute tool-1 from this address?
//! warden check --state state.json --user alice --action execute \
//!     --category tool --resource tool-1 --context '{"ip_address": "10.0.0.7"}'
//!
//! # What can alice do?
//! warden permissions --state state.json --user alice
//!
//! # Find unconditional or broken policies
//! warden lint --state state.json
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warden_config::{ConfigLoader, WardenConfig};

/// Warden - access decisions from roles, policies and resource overlays.
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory to load warden.toml from.
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Decide one access request. Exits 0 when allowed, 2 when denied.
    Check {
        #[command(flatten)]
        state: commands::StateArgs,

        /// User id of the principal.
        #[arg(short, long)]
        user: String,

        /// Requested action (execute, view, select, ...).
        #[arg(short, long)]
        action: String,

        /// Resource category (tool, knowledge_base, database, ...).
        #[arg(short, long)]
        category: String,

        /// Concrete resource id, enables overlay checks.
        #[arg(short, long)]
        resource: Option<String>,

        /// Request context as a JSON object.
        #[arg(long)]
        context: Option<String>,

        /// Evaluate at this RFC 3339 instant instead of now.
        #[arg(long)]
        at: Option<String>,

        /// Print the decision as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print a user's effective permissions.
    Permissions {
        #[command(flatten)]
        state: commands::StateArgs,

        /// User id of the principal.
        #[arg(short, long)]
        user: String,

        /// Print as a JSON array.
        #[arg(long)]
        json: bool,
    },

    /// Report unconditional and malformed policies. Exits 1 on errors.
    Lint {
        #[command(flatten)]
        state: commands::StateArgs,

        /// Print findings as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration.
    Config {
        /// Output format (text, json, toml).
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .with_project_dir(&cli.project)
        .load()
        .context("Failed to load configuration")?;

    init_logging(&config)?;

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            state,
            user,
            action,
            category,
            resource,
            context,
            at,
            json,
        } => commands::check::run(
            &config,
            &state,
            &commands::check::CheckArgs {
                user,
                action,
                category,
                resource,
                context,
                at,
                json,
            },
        ),
        Commands::Permissions { state, user, json } => {
            commands::permissions::run(&config, &state, &user, json)
        }
        Commands::Lint { state, json } => commands::lint::run(&config, &state, json),
        Commands::Config { format } => {
            commands::config::show(&config, &format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(config: &WardenConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid logging level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
