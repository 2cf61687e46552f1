//! Seed parser with validation
//!
//! Checks the schema version, id presence and per-table uniqueness, and
//! that numeric fields are finite.

use crate::errors::{seed_validation, Result};
use crate::seed::format::{SeedBundle, SEED_SCHEMA_VERSION};
use opsdeck_core::model::Row;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn parse_seed_file(path: &Path) -> Result<SeedBundle> {
    let content = fs::read_to_string(path)
        .map_err(|e| seed_validation(&format!("Failed to read seed file: {}", e)))?;
    parse_seed_str(&content)
}

pub fn parse_seed_str(content: &str) -> Result<SeedBundle> {
    let bundle: SeedBundle = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;
    validate_bundle(&bundle)?;
    Ok(bundle)
}

fn validate_bundle(bundle: &SeedBundle) -> Result<()> {
    if bundle.schema_version != SEED_SCHEMA_VERSION {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected {}",
            bundle.schema_version, SEED_SCHEMA_VERSION
        )));
    }

    let mut seen = HashSet::new();
    for row in bundle.rows() {
        let table = row.table();
        if row.id().trim().is_empty() {
            return Err(seed_validation(&format!("Empty id in {}", table)));
        }
        if !seen.insert((table, row.id().to_string())) {
            return Err(seed_validation(&format!(
                "Duplicate id {} in {}",
                row.id(),
                table
            )));
        }
        let non_finite = match &row {
            Row::Job(r) => r.score.is_some_and(|s| !s.is_finite()),
            Row::Usage(r) => r.cost.is_some_and(|c| !c.is_finite()),
            _ => false,
        };
        if non_finite {
            return Err(seed_validation(&format!(
                "Non-finite number in {} row {}",
                table,
                row.id()
            )));
        }
    }
    Ok(())
}
