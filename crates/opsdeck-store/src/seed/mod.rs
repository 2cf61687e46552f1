//! Seed bundles: YAML fixture data for the record tables
//!
//! Provides:
//! - The bundle format
//! - YAML parser with validation
//! - Digest canonicalization
//! - Transactional importer, idempotent per digest

pub mod digest;
pub mod format;
pub mod importer;
pub mod parser;

pub use digest::compute_seed_digest;
pub use format::{SeedBundle, SEED_SCHEMA_VERSION};
pub use importer::{import_seed, import_seed_bundle, ImportReport};
pub use parser::{parse_seed_file, parse_seed_str};
