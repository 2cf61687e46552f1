//! opsdeck CLI
//!
//! Command-line front end for the operations dashboard: loads seed data
//! into the local store, renders filtered views and the aggregate summary,
//! and probes configured services. Results are printed as JSON.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "opsdeck")]
#[command(about = "opsdeck - operations dashboard queries", long_about = None)]
struct Cli {
    /// Path to the TOML config file; a missing file means defaults
    #[arg(long, global = true, default_value = ".opsdeck/config.toml")]
    config: PathBuf,

    /// Override the store path from the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Human-readable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the store and apply migrations
    Init,
    /// Import seed bundles
    Seed(commands::seed::SeedArgs),
    /// Query one table through the filter pipeline
    View(commands::view::ViewArgs),
    /// Aggregate summary of runs, usage and activity
    Summary(commands::summary::SummaryArgs),
    /// Probe the configured health endpoints
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    opsdeck_core::logging_facility::init(if cli.verbose {
        opsdeck_core::logging_facility::Profile::Development
    } else {
        opsdeck_core::logging_facility::Profile::Production
    });

    let result = match commands::Context::load(&cli.config, cli.db) {
        Ok(ctx) => match cli.command {
            Commands::Init => commands::init::execute(&ctx),
            Commands::Seed(args) => commands::seed::execute(&ctx, args),
            Commands::View(args) => commands::view::execute(&ctx, args).await,
            Commands::Summary(args) => commands::summary::execute(&ctx, args).await,
            Commands::Health => commands::health::execute(&ctx).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
