//! `sync`, `sync-terms` and `deep-sync`

use clap::Args;
use shadow_core::{reconcile_with_context, ReconcileMode, ReconcileOptions};

use super::{CommandResult, Context};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Source record kind
    #[arg(long)]
    pub cpt: String,

    /// Mirror namespace
    #[arg(long)]
    pub tax: String,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Log every mutation
    #[arg(long)]
    pub verbose: bool,
}

pub fn execute(ctx: &Context, mode: ReconcileMode, args: SyncArgs) -> CommandResult {
    ctx.init_logging(args.verbose);
    let (store, registry) = ctx.open_store()?;

    let options = ReconcileOptions {
        dry_run: args.dry_run,
        verbose: args.verbose,
    };
    let report = reconcile_with_context(
        &store,
        &args.cpt,
        &args.tax,
        mode,
        options,
        registry.notifier(),
        &ctx.request.child(),
    )?;

    print!("{}", report);
    for item in &report.skipped {
        eprintln!("Warning: skipped {}", item);
    }

    Ok(())
}
