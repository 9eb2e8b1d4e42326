//! `check`: inspect one record/node pair

use clap::{Args, ValueEnum};
use shadow_core::{check_node, check_record, NodeId, RecordId, Store};

use super::{CommandResult, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckTarget {
    /// `--id` names a record
    #[value(name = "post_type")]
    PostType,
    /// `--id` names a node
    #[value(name = "taxonomy")]
    Taxonomy,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub target: CheckTarget,

    #[arg(long)]
    pub id: u64,

    /// Mirror namespace
    #[arg(long)]
    pub tax: String,

    /// Expected record kind when checking from the node side
    #[arg(long)]
    pub cpt: Option<String>,
}

pub fn execute(ctx: &Context, args: CheckArgs) -> CommandResult {
    ctx.init_logging(false);
    let (store, _registry) = ctx.open_store()?;

    let report = match args.target {
        CheckTarget::PostType => {
            if let Some(kind) = args.cpt.as_deref() {
                if !store.has_record_kind(kind)? {
                    return Err(format!("Unknown record kind: {}", kind).into());
                }
                if let Some(record) = store.get_record(RecordId(args.id))? {
                    if record.kind != kind {
                        return Err(
                            format!("Record {} is a {}, not a {}", args.id, record.kind, kind)
                                .into(),
                        );
                    }
                }
            }
            check_record(&store, RecordId(args.id), &args.tax)?
        }
        CheckTarget::Taxonomy => {
            check_node(&store, NodeId(args.id), &args.tax, args.cpt.as_deref())?
        }
    };

    print!("{}", report);
    if report.passed() {
        Ok(())
    } else {
        Err(format!("{} problem(s) found", report.problems.len()).into())
    }
}
