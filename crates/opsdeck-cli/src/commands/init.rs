//! Store initialization
//!
//! Usage: opsdeck init [--db <PATH>]

use super::{print_json, Context};
use serde_json::json;

pub fn execute(ctx: &Context) -> anyhow::Result<()> {
    opsdeck_store::db::open_and_migrate(&ctx.db_path)?;
    print_json(&json!({
        "db": ctx.db_path.display().to_string(),
        "migrations": opsdeck_store::migrations::get_migrations().len(),
    }))
}
