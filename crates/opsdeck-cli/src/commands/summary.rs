//! Aggregate summary
//!
//! Usage: opsdeck summary [--as-of <RFC3339>] [--skip-health]

use super::{parse_as_of, print_json, Context};
use clap::Args;
use opsdeck_engine::HealthChecker;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Compute windows as of this RFC 3339 timestamp
    #[arg(long)]
    pub as_of: Option<String>,

    /// Leave the health section empty
    #[arg(long)]
    pub skip_health: bool,
}

pub async fn execute(ctx: &Context, args: SummaryArgs) -> anyhow::Result<()> {
    let now = parse_as_of(args.as_of.as_deref())?;
    let source = ctx.row_source()?;
    let checker = HealthChecker::new()?;
    let endpoints = if args.skip_health {
        &[][..]
    } else {
        &ctx.config.health.endpoints[..]
    };

    let report = opsdeck_engine::build_report(
        &source,
        &checker,
        endpoints,
        &ctx.config.query,
        &ctx.config.dashboard,
        now,
    )
    .await;
    print_json(&report)
}
