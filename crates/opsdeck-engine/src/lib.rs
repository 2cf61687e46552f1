//! opsdeck engine - async orchestration for dashboard views
//!
//! Ties the pure pieces in `opsdeck-core` to real I/O:
//! - `RowSource`: the row source contract, backed by SQLite or memory
//! - `ViewSession`: sequence-guarded, debounced view queries with many
//!   fetches in flight
//! - `fetch_view`: Tier 1 pushdown, full scans when Tier 2 is active, sort
//!   and pagination
//! - Dashboard report with per-section failure isolation
//! - Bounded-timeout health probes
//! - TOML configuration

pub mod config;
pub mod health;
pub mod report;
pub mod source;
pub mod view;

pub use config::EngineConfig;
pub use health::{HealthChecker, ServiceHealth};
pub use report::{build_report, DashboardReport, Section};
pub use source::{MemoryRowSource, RowSource, SqliteRowSource};
pub use view::{fetch_view, ViewResult, ViewSession};
