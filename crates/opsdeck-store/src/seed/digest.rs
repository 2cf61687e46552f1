//! Seed digest canonicalization
//!
//! Rows are ordered by id within each table before hashing, so two bundles
//! that differ only in row order share a digest.

use crate::seed::format::SeedBundle;
use sha2::{Digest, Sha256};

fn canonicalize(bundle: &SeedBundle) -> SeedBundle {
    let mut canonical = bundle.clone();
    canonical.jobs.sort_by(|a, b| a.id.cmp(&b.id));
    canonical.emails.sort_by(|a, b| a.id.cmp(&b.id));
    canonical.contacts.sort_by(|a, b| a.id.cmp(&b.id));
    canonical.service_runs.sort_by(|a, b| a.id.cmp(&b.id));
    canonical.events.sort_by(|a, b| a.id.cmp(&b.id));
    canonical.usage_records.sort_by(|a, b| a.id.cmp(&b.id));
    canonical
}

/// SHA256 hex digest of the canonical JSON form
pub fn compute_seed_digest(bundle: &SeedBundle) -> String {
    // Struct fields serialize in declaration order; payload maps are sorted
    // by serde_json's default BTreeMap-backed Map.
    let json = serde_json::to_string(&canonicalize(bundle)).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}
