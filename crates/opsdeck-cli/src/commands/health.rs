//! Health probes
//!
//! Usage: opsdeck health

use super::{print_json, Context};
use opsdeck_engine::HealthChecker;

pub async fn execute(ctx: &Context) -> anyhow::Result<()> {
    let checker = HealthChecker::new()?;
    let results = checker.probe_all(&ctx.config.health.endpoints).await;
    print_json(&results)
}
