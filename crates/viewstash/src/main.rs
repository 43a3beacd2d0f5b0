//! viewstash - session scope cache tooling
//!
//! Main entry point for the viewstash CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{capacity, soak};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// viewstash - session scope cache tooling
#[derive(Parser)]
#[command(name = "viewstash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved per-session scope capacity and where it came from
    Capacity(capacity::CapacityArgs),

    /// Hammer a bounded cache from several threads and verify its invariants
    Soak(soak::SoakArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "viewstash=debug,viewstash_cache=debug,viewstash_config=debug,viewstash_session=debug,info"
    } else {
        "viewstash=info,viewstash_config=info,warn"
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Capacity(args) => capacity::run(args, &ctx),
        Commands::Soak(args) => soak::run(args, &ctx),
    }
}
