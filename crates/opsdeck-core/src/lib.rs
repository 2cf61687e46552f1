//! opsdeck core - request coordination and aggregation for the operations dashboard
//!
//! This crate holds everything that can be expressed without I/O:
//! - Row model for the append-only tables the dashboard reads
//! - `FilterState` and its closed enumerations, validated before dispatch
//! - Free-text escaping for pattern-match filters
//! - The two-tier filter pipeline (store-evaluated and client-evaluated predicates)
//! - Deterministic multi-key sorting
//! - Pure aggregation over immutable row snapshots with an injected "now"
//! - The sequence-guarded query coordinator and the search debouncer
//!
//! Async fetching and the SQLite backing store live in `opsdeck-engine` and
//! `opsdeck-store`.

pub mod aggregate;
pub mod clock;
pub mod coordinator;
pub mod errors;
pub mod escape;
pub mod filter;
pub mod logging_facility;
pub mod model;
pub mod sort;

// Macros reach schema constants through this path.
pub use opsdeck_core_types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{Debouncer, QueryCoordinator, QueryRequest, Resolution, ViewState};
pub use errors::{DashError, ExError, ExErrorKind, Result};
pub use filter::{FilterPipeline, RowRequest, Tier1Predicate, Tier2Predicate};
pub use model::{FilterState, Row, RowTable, SortKey};
