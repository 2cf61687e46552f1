//! Seed importer
//!
//! A bundle is imported in one transaction: every row and the
//! `seed_imports` record commit together or not at all. Re-importing a
//! bundle with an already recorded digest is a no-op.

use crate::errors::{from_rusqlite, Result};
use crate::repo::insert_row;
use crate::seed::{compute_seed_digest, parse_seed_file, SeedBundle};
use opsdeck_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub digest: String,
    /// Rows newly written; ids already present are skipped
    pub inserted: u64,
    pub skipped: u64,
    pub already_imported: bool,
}

pub fn import_seed(path: &Path, conn: &mut Connection) -> Result<ImportReport> {
    let bundle = parse_seed_file(path)?;
    import_seed_bundle(&bundle, conn)
}

pub fn import_seed_bundle(bundle: &SeedBundle, conn: &mut Connection) -> Result<ImportReport> {
    log_op_start!("seed_import", row_count = bundle.row_count() as u64);
    let start = Instant::now();

    let report = import_impl(bundle, conn).map_err(|e| {
        log_op_error!(
            "seed_import",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "seed_import",
        duration_ms = start.elapsed().as_millis() as u64,
        inserted = report.inserted,
        already_imported = report.already_imported
    );
    Ok(report)
}

fn import_impl(bundle: &SeedBundle, conn: &mut Connection) -> Result<ImportReport> {
    let digest = compute_seed_digest(bundle);

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM seed_imports WHERE digest = ?1",
            [&digest],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    if existing.is_some() {
        return Ok(ImportReport {
            digest,
            inserted: 0,
            skipped: bundle.row_count() as u64,
            already_imported: true,
        });
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    let mut inserted = 0u64;
    let mut skipped = 0u64;
    for row in bundle.rows() {
        if insert_row(&tx, &row)? {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }
    tx.execute(
        "INSERT INTO seed_imports (digest, row_count, imported_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            digest,
            bundle.row_count() as i64,
            chrono::Utc::now().timestamp_millis()
        ],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    Ok(ImportReport {
        digest,
        inserted,
        skipped,
        already_imported: false,
    })
}
