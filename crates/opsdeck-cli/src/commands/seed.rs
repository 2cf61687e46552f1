//! Seed import command
//!
//! Usage: opsdeck seed <PATH>...
//!
//! Each path is a YAML bundle or a directory of bundles (imported in
//! file name order).

use super::{print_json, Context};
use clap::Args;
use opsdeck_store::seed::ImportReport;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Seed YAML files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Serialize)]
struct SeedOutcome {
    file: String,
    #[serde(flatten)]
    report: ImportReport,
}

fn expand(path: PathBuf) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path]);
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(&path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

pub fn execute(ctx: &Context, args: SeedArgs) -> anyhow::Result<()> {
    let mut conn = opsdeck_store::db::open_and_migrate(&ctx.db_path)?;

    let mut outcomes = Vec::new();
    for path in args.paths {
        for file in expand(path)? {
            let report = opsdeck_store::seed::import_seed(&file, &mut conn)?;
            outcomes.push(SeedOutcome {
                file: file.display().to_string(),
                report,
            });
        }
    }
    print_json(&outcomes)
}
