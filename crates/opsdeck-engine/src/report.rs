//! Dashboard report: aggregate sections plus service health.
//!
//! Each section reads its own table, so a failing source flags only that
//! section and the rest of the report still renders.

use crate::config::{DashboardConfig, HealthEndpoint, QueryConfig};
use crate::health::{HealthChecker, ServiceHealth};
use crate::source::{fetch_all, RowSource};
use chrono::{DateTime, Duration, Utc};
use opsdeck_core::aggregate;
use opsdeck_core::errors::{ExError, Result};
use opsdeck_core::filter::{RowRequest, Tier1Predicate};
use opsdeck_core::model::{
    ActivityItem, ActorCount, AggregateView, EventRow, LatestRun, Row, RowTable, ServiceRunRow,
    UsageRow, UsageSummary,
};
use opsdeck_core::{log_op_end, log_op_start};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Error as rendered in a report section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionError {
    pub code: String,
    pub message: String,
}

impl From<&ExError> for SectionError {
    fn from(err: &ExError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// A `{data, error}` pair; exactly one side is set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<T> {
    pub data: Option<T>,
    pub error: Option<SectionError>,
    /// Input rows were capped at `max_rows_per_section`
    pub truncated: bool,
}

impl<T> Section<T> {
    pub fn loaded(data: T, truncated: bool) -> Self {
        Self {
            data: Some(data),
            error: None,
            truncated,
        }
    }

    pub fn failed(err: &ExError) -> Self {
        Self {
            data: None,
            error: Some(err.into()),
            truncated: false,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub latest_by_service: Section<BTreeMap<String, LatestRun>>,
    pub usage_summary: Section<UsageSummary>,
    pub counts_by_actor: Section<Vec<ActorCount>>,
    pub recent_activity: Section<Vec<ActivityItem>>,
    pub health: Vec<ServiceHealth>,
}

impl DashboardReport {
    /// The combined view, when every aggregate section loaded
    pub fn aggregate_view(&self) -> Option<AggregateView> {
        Some(AggregateView {
            latest_by_service: self.latest_by_service.data.clone()?,
            usage_summary: self.usage_summary.data.clone()?,
            counts_by_actor: self.counts_by_actor.data.clone()?,
        })
    }

    pub fn failed_sections(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.latest_by_service.is_ok() {
            failed.push("latest_by_service");
        }
        if !self.usage_summary.is_ok() {
            failed.push("usage_summary");
        }
        if !self.counts_by_actor.is_ok() {
            failed.push("counts_by_actor");
        }
        if !self.recent_activity.is_ok() {
            failed.push("recent_activity");
        }
        failed
    }
}

struct Fetched<T> {
    rows: Vec<T>,
    truncated: bool,
}

async fn fetch_table<T>(
    source: &dyn RowSource,
    request: RowRequest,
    query: &QueryConfig,
    dashboard: &DashboardConfig,
    pick: fn(Row) -> Option<T>,
) -> Result<Fetched<T>> {
    let table = request.table;
    let scan = fetch_all(
        source,
        &request,
        query.page_size,
        dashboard.max_rows_per_section,
    )
    .await?;
    if scan.truncated {
        tracing::warn!(
            op = "build_report",
            table = table.as_str(),
            max_rows_per_section = dashboard.max_rows_per_section,
            "section input truncated"
        );
    }
    Ok(Fetched {
        rows: scan.rows.into_iter().filter_map(pick).collect(),
        truncated: scan.truncated,
    })
}

fn pick_run(row: Row) -> Option<ServiceRunRow> {
    match row {
        Row::ServiceRun(r) => Some(r),
        _ => None,
    }
}

fn pick_usage(row: Row) -> Option<UsageRow> {
    match row {
        Row::Usage(r) => Some(r),
        _ => None,
    }
}

fn pick_event(row: Row) -> Option<EventRow> {
    match row {
        Row::Event(r) => Some(r),
        _ => None,
    }
}

fn section<T, U>(result: &Result<Fetched<T>>, build: impl FnOnce(&[T]) -> U) -> Section<U> {
    match result {
        Ok(fetched) => Section::loaded(build(&fetched.rows), fetched.truncated),
        Err(e) => Section::failed(e),
    }
}

/// Build the full report as of `now`
pub async fn build_report(
    source: &dyn RowSource,
    checker: &HealthChecker,
    endpoints: &[HealthEndpoint],
    query: &QueryConfig,
    dashboard: &DashboardConfig,
    now: DateTime<Utc>,
) -> DashboardReport {
    log_op_start!("build_report");
    let start = Instant::now();

    let windows = dashboard.windows();
    let lookback = Duration::hours(i64::from(windows.activity_lookback_hours));
    let usage_window = Duration::hours(i64::from(windows.usage_window_hours));
    let activity_cutoff = now
        .checked_sub_signed(lookback)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let (runs, usage, events, health) = futures::join!(
        fetch_table(
            source,
            RowRequest::new(RowTable::ServiceRuns),
            query,
            dashboard,
            pick_run
        ),
        fetch_table(
            source,
            RowRequest::new(RowTable::UsageRecords),
            query,
            dashboard,
            pick_usage
        ),
        fetch_table(
            source,
            RowRequest::new(RowTable::Events)
                .with_predicate(Tier1Predicate::OccurredAfter(activity_cutoff)),
            query,
            dashboard,
            pick_event
        ),
        checker.probe_all(endpoints),
    );

    let report = DashboardReport {
        generated_at: now,
        latest_by_service: section(&runs, aggregate::latest_runs),
        usage_summary: section(&usage, |rows| {
            aggregate::usage_summary(rows, usage_window, now)
        }),
        counts_by_actor: section(&events, |rows| {
            aggregate::counts_by_actor(rows, lookback, now)
        }),
        recent_activity: section(&events, |rows| {
            aggregate::recent_activity(rows, lookback, now, dashboard.activity_limit)
        }),
        health,
    };

    let failed = report.failed_sections();
    log_op_end!(
        "build_report",
        duration_ms = start.elapsed().as_millis() as u64,
        failed_sections = failed.len() as u64
    );
    report
}
