//! DreamTrade CLI - Database migrations and site settings management.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! dt-cli migrate
//!
//! # Show current site settings
//! dt-cli settings show [--json]
//!
//! # List settings fields
//! dt-cli settings fields
//!
//! # Edit settings
//! dt-cli settings set store_phone=01000000000 delivery_fee_cairo=60
//!
//! # Restore defaults
//! dt-cli settings reset
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `settings` - Inspect and edit the site settings record

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dt-cli")]
#[command(author, version, about = "DreamTrade CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Inspect and edit site settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show {
        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every field with its kind, group and default
    Fields,
    /// Set one or more fields
    Set {
        /// Assignments of the form `<field>=<value>`
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
    /// Restore every field to its default
    Reset,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Settings { action } => match action {
            SettingsAction::Show { json } => commands::settings::show(json).await?,
            SettingsAction::Fields => commands::settings::fields(),
            SettingsAction::Set { assignments } => {
                commands::settings::set(&assignments).await?;
            }
            SettingsAction::Reset => commands::settings::reset().await?,
        },
    }
    Ok(())
}
