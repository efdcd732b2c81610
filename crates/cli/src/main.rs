//! Shopstate CLI - seeding and inspection tools for the persisted slots.
//!
//! # Usage
//!
//! ```bash
//! # Seed every absent slot with demo data
//! shopstate seed
//!
//! # Reset the product catalog to seed data
//! shopstate reset
//!
//! # Print order statistics and user count
//! shopstate stats
//!
//! # Dump a collection as pretty JSON
//! shopstate list products
//! ```
//!
//! The data directory comes from `SHOPSTATE_DATA_DIR` (default `./data`),
//! loaded via `.env` when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "shopstate")]
#[command(author, version, about = "Shopstate CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed every absent slot with demo data
    Seed,
    /// Reset the product catalog to seed data
    Reset,
    /// Print order statistics and user count
    Stats,
    /// Dump one collection as pretty JSON
    List {
        /// Which collection to dump
        #[arg(value_enum)]
        collection: Collection,
    },
}

/// Dumpable collections.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Collection {
    Products,
    Cart,
    Orders,
    Users,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::from_env()?;

    match cli.command {
        Commands::Seed => commands::seed::run(&config)?,
        Commands::Reset => commands::seed::reset(&config)?,
        Commands::Stats => commands::inspect::stats(&config)?,
        Commands::List { collection } => commands::inspect::list(&config, collection)?,
    }
    Ok(())
}
