//! Engine configuration, loaded from TOML
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration. Unknown keys are rejected.

use opsdeck_core::aggregate::{
    AggregateWindows, DEFAULT_ACTIVITY_LIMIT, DEFAULT_ACTIVITY_LOOKBACK_HOURS,
    DEFAULT_USAGE_WINDOW_HOURS,
};
use opsdeck_core::errors::{ExError, ExErrorKind, Result};
use opsdeck_core_types::Sensitive;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on rows scanned when client-side predicates are active
    #[serde(default = "default_max_scan_rows")]
    pub max_scan_rows: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default = "default_usage_window_hours")]
    pub usage_window_hours: u32,
    #[serde(default = "default_activity_lookback_hours")]
    pub activity_lookback_hours: u32,
    #[serde(default = "default_max_rows_per_section")]
    pub max_rows_per_section: u64,
    /// Events shown in the recent activity feed
    #[serde(default = "default_activity_limit")]
    pub activity_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default)]
    pub endpoints: Vec<HealthEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthEndpoint {
    pub name: String,
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub bearer_token: Option<Sensitive<String>>,
}

impl HealthEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeout_ms: default_timeout_ms(),
            bearer_token: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".opsdeck/opsdeck.db")
}

fn default_page_size() -> u32 {
    50
}

fn default_max_scan_rows() -> u64 {
    5000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_usage_window_hours() -> u32 {
    DEFAULT_USAGE_WINDOW_HOURS
}

fn default_activity_lookback_hours() -> u32 {
    DEFAULT_ACTIVITY_LOOKBACK_HOURS
}

fn default_max_rows_per_section() -> u64 {
    10_000
}

fn default_activity_limit() -> usize {
    DEFAULT_ACTIVITY_LIMIT
}

fn default_timeout_ms() -> u64 {
    3000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_scan_rows: default_max_scan_rows(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl QueryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            usage_window_hours: default_usage_window_hours(),
            activity_lookback_hours: default_activity_lookback_hours(),
            max_rows_per_section: default_max_rows_per_section(),
            activity_limit: default_activity_limit(),
        }
    }
}

impl DashboardConfig {
    pub fn windows(&self) -> AggregateWindows {
        AggregateWindows {
            usage_window_hours: self.usage_window_hours,
            activity_lookback_hours: self.activity_lookback_hours,
        }
    }
}

/// Ten years; larger windows cannot be subtracted from a timestamp safely
pub const MAX_WINDOW_HOURS: u32 = 87_600;

fn config_error(message: String) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(message)
}

impl EngineConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(content)
            .map_err(|e| config_error(format!("failed to parse TOML config: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(op = "load_config", path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.query.page_size == 0 {
            return Err(config_error("query.page_size must be at least 1".into()));
        }
        if self.query.max_scan_rows == 0 {
            return Err(config_error("query.max_scan_rows must be at least 1".into()));
        }
        if self.dashboard.max_rows_per_section == 0 {
            return Err(config_error(
                "dashboard.max_rows_per_section must be at least 1".into(),
            ));
        }
        let windows = [
            ("usage_window_hours", self.dashboard.usage_window_hours),
            ("activity_lookback_hours", self.dashboard.activity_lookback_hours),
        ];
        for (name, hours) in windows {
            if hours > MAX_WINDOW_HOURS {
                return Err(config_error(format!(
                    "dashboard.{} must be at most {} (got {})",
                    name, MAX_WINDOW_HOURS, hours
                )));
            }
        }
        for endpoint in &self.health.endpoints {
            if endpoint.timeout_ms == 0 {
                return Err(config_error(format!(
                    "health endpoint '{}' needs a non-zero timeout_ms",
                    endpoint.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.store.path, PathBuf::from(".opsdeck/opsdeck.db"));
        assert_eq!(cfg.query.page_size, 50);
        assert_eq!(cfg.query.max_scan_rows, 5000);
        assert_eq!(cfg.query.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.dashboard.usage_window_hours, 168);
        assert_eq!(cfg.dashboard.activity_lookback_hours, 24);
        assert!(cfg.health.endpoints.is_empty());
    }

    #[test]
    fn test_health_endpoints_parse_with_redacted_token() {
        let cfg = EngineConfig::from_toml_str(
            r#"
[query]
page_size = 25

[[health.endpoints]]
name = "mailer"
url = "http://127.0.0.1:9000/health"
bearer_token = "s3cret"

[[health.endpoints]]
name = "crawler"
url = "http://127.0.0.1:9001/health"
timeout_ms = 500
"#,
        )
        .unwrap();
        assert_eq!(cfg.query.page_size, 25);
        assert_eq!(cfg.health.endpoints.len(), 2);
        assert_eq!(cfg.health.endpoints[0].timeout_ms, 3000);
        assert_eq!(cfg.health.endpoints[1].timeout(), Duration::from_millis(500));
        let token = cfg.health.endpoints[0].bearer_token.as_ref().unwrap();
        assert_eq!(token.expose(), "s3cret");
        assert!(!format!("{:?}", cfg).contains("s3cret"));
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = EngineConfig::from_toml_str("[query]\npage_sise = 10\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let err = EngineConfig::from_toml_str("[query]\npage_size = 0\n").unwrap_err();
        assert!(err.message().contains("page_size"));
    }

    #[test]
    fn test_oversized_windows_are_rejected() {
        let huge = "[dashboard]\nactivity_lookback_hours = 4000000000\n";
        let err = EngineConfig::from_toml_str(huge).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
        assert!(err.message().contains("activity_lookback_hours"));

        let over = "[dashboard]\nusage_window_hours = 87601\n";
        let err = EngineConfig::from_toml_str(over).unwrap_err();
        assert!(err.message().contains("usage_window_hours"));

        let at_bound = "[dashboard]\nusage_window_hours = 87600\n";
        let cfg = EngineConfig::from_toml_str(at_bound).unwrap();
        assert_eq!(cfg.dashboard.usage_window_hours, MAX_WINDOW_HOURS);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.query.page_size, 50);
    }
}
