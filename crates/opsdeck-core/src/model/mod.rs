pub mod aggregate;
pub mod event;
pub mod filter_state;
pub mod row;

pub use aggregate::{ActivityItem, ActorCount, AggregateView, LatestRun, ModelUsage, UsageSummary};
pub use event::EventPayload;
pub use filter_state::{FilterState, LocationBucket, RawFilter, ScoreBand, SortKey, TimeWindow};
pub use row::{
    ContactRow, EmailRow, EventRow, FilterField, JobRow, Row, RowTable, ServiceRunRow, UsageRow,
};
