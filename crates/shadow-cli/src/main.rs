//! Shadow CLI
//!
//! Command-line interface for reconciling and checking record/node mirrors

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shadow_core::config::DEFAULT_CONFIG_FILE;
use shadow_core::ReconcileMode;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "shadow")]
#[command(about = "Shadow - keep records and their mirror nodes in sync", long_about = None)]
struct Cli {
    /// SQLite store path (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file; a missing file means defaults
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create missing nodes and delete orphaned ones
    Sync(commands::sync::SyncArgs),
    /// Like sync, but relink pairs that lost their pointers instead of recreating them
    SyncTerms(commands::sync::SyncArgs),
    /// Only create nodes for records whose slug is not taken yet
    DeepSync(commands::sync::SyncArgs),
    /// Check one record/node pair
    Check(commands::check::CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = commands::Context::load(cli.db, &cli.config).and_then(|ctx| match cli.command {
        Commands::Sync(args) => commands::sync::execute(&ctx, ReconcileMode::Sync, args),
        Commands::SyncTerms(args) => commands::sync::execute(&ctx, ReconcileMode::SyncTerms, args),
        Commands::DeepSync(args) => commands::sync::execute(&ctx, ReconcileMode::DeepSync, args),
        Commands::Check(args) => commands::check::execute(&ctx, args),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
