//! Subcommand implementations

pub mod health;
pub mod init;
pub mod seed;
pub mod summary;
pub mod view;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use opsdeck_engine::{EngineConfig, SqliteRowSource};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Loaded configuration plus the resolved store path
pub struct Context {
    pub config: EngineConfig,
    pub db_path: PathBuf,
}

impl Context {
    pub fn load(config_path: &Path, db_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = EngineConfig::load(config_path)?;
        let db_path = db_override.unwrap_or_else(|| config.store.path.clone());
        Ok(Self { config, db_path })
    }

    pub fn row_source(&self) -> anyhow::Result<SqliteRowSource> {
        SqliteRowSource::open(&self.db_path)
            .with_context(|| format!("failed to open store {}", self.db_path.display()))
    }
}

/// Reference time for window computations; defaults to the system clock
pub fn parse_as_of(value: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match value {
        None => Ok(Utc::now()),
        Some(v) => Ok(DateTime::parse_from_rfc3339(v)
            .with_context(|| format!("invalid --as-of timestamp '{}'", v))?
            .with_timezone(&Utc)),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
