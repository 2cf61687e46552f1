//! Pure aggregation over immutable row snapshots.
//!
//! Every function here is total: a row missing a field contributes a
//! documented default instead of being dropped. "Now" is always passed in.

use crate::model::{
    ActivityItem, ActorCount, AggregateView, EventPayload, EventRow, LatestRun, ModelUsage, Row,
    ServiceRunRow, UsageRow, UsageSummary,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

pub const DEFAULT_SCORE: f64 = 0.0;
pub const DEFAULT_COST: f64 = 0.0;
pub const DEFAULT_DURATION_MS: i64 = 0;
pub const DEFAULT_STATUS: &str = "unknown";
pub const DEFAULT_SERVICE: &str = "unknown";
pub const DEFAULT_MODEL: &str = "unknown";
pub const DEFAULT_ACTOR: &str = "unknown";

pub const DEFAULT_USAGE_WINDOW_HOURS: u32 = 168;
pub const DEFAULT_ACTIVITY_LOOKBACK_HOURS: u32 = 24;
pub const DEFAULT_ACTIVITY_LIMIT: usize = 20;

/// One row per distinct key: the most recent by `time_of`.
///
/// Sorts internally (stable, newest first), so on equal timestamps the row
/// that came first in `rows` wins.
pub fn latest_by_key<'a, T, K, FK, FT>(rows: &'a [T], key_of: FK, time_of: FT) -> BTreeMap<K, &'a T>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FT: Fn(&T) -> DateTime<Utc>,
{
    let mut ordered: Vec<&T> = rows.iter().collect();
    ordered.sort_by_key(|row| std::cmp::Reverse(time_of(row)));

    let mut latest = BTreeMap::new();
    for row in ordered {
        latest.entry(key_of(row)).or_insert(row);
    }
    latest
}

/// Sum of `amount_of` over rows with `now - time_of(row) <= window`.
///
/// Rows stamped after `now` are inside every window.
pub fn windowed_sum<T, FA, FT>(
    rows: &[T],
    amount_of: FA,
    time_of: FT,
    window: Duration,
    now: DateTime<Utc>,
) -> f64
where
    FA: Fn(&T) -> f64,
    FT: Fn(&T) -> DateTime<Utc>,
{
    rows.iter()
        .filter(|row| now - time_of(row) <= window)
        .map(amount_of)
        .sum()
}

/// Row count per key, sorted by count descending then key ascending
pub fn group_count<T, K, FK>(rows: &[T], key_of: FK) -> Vec<(K, u64)>
where
    K: Ord,
    FK: Fn(&T) -> K,
{
    let mut counts: BTreeMap<K, u64> = BTreeMap::new();
    for row in rows {
        *counts.entry(key_of(row)).or_insert(0) += 1;
    }
    let mut grouped: Vec<(K, u64)> = counts.into_iter().collect();
    // BTreeMap iteration is key-ascending; a stable sort on count keeps it
    grouped.sort_by(|a, b| b.1.cmp(&a.1));
    grouped
}

fn usage_model(row: &UsageRow) -> String {
    row.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

fn usage_cost(row: &UsageRow) -> f64 {
    row.cost.filter(|c| c.is_finite()).unwrap_or(DEFAULT_COST)
}

/// Calls and cost per model, ordered like [`group_count`]
pub fn usage_by_model(rows: &[UsageRow]) -> Vec<ModelUsage> {
    let mut cost_by_model: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        *cost_by_model.entry(usage_model(row)).or_insert(0.0) += usage_cost(row);
    }
    group_count(rows, usage_model)
        .into_iter()
        .map(|(model, calls)| {
            let cost = cost_by_model.get(&model).copied().unwrap_or(DEFAULT_COST);
            ModelUsage { model, calls, cost }
        })
        .collect()
}

pub fn latest_runs(runs: &[ServiceRunRow]) -> BTreeMap<String, LatestRun> {
    latest_by_key(
        runs,
        |run| {
            run.service
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVICE.to_string())
        },
        |run| run.started_at,
    )
    .into_iter()
    .map(|(service, run)| {
        let latest = LatestRun {
            service: service.clone(),
            last_run: run.started_at,
            duration_ms: run.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
            status: run
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        };
        (service, latest)
    })
    .collect()
}

pub fn usage_summary(rows: &[UsageRow], window: Duration, now: DateTime<Utc>) -> UsageSummary {
    UsageSummary {
        total_calls: rows.len() as u64,
        total_cost: rows.iter().map(usage_cost).sum(),
        last_7d_cost: windowed_sum(rows, usage_cost, |r| r.created_at, window, now),
        by_model: usage_by_model(rows),
    }
}

/// Event counts per actor over events within `lookback` of `now`
pub fn counts_by_actor(
    events: &[EventRow],
    lookback: Duration,
    now: DateTime<Utc>,
) -> Vec<ActorCount> {
    let recent: Vec<&EventRow> = events
        .iter()
        .filter(|e| now - e.created_at <= lookback)
        .collect();
    group_count(&recent, |e| {
        e.actor.clone().unwrap_or_else(|| DEFAULT_ACTOR.to_string())
    })
    .into_iter()
    .map(|(actor, count)| ActorCount { actor, count })
    .collect()
}

/// The newest `limit` events within `lookback` of `now`, payloads decoded
pub fn recent_activity(
    events: &[EventRow],
    lookback: Duration,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ActivityItem> {
    let mut recent: Vec<&EventRow> = events
        .iter()
        .filter(|e| now - e.created_at <= lookback)
        .collect();
    recent.sort_by_key(|e| std::cmp::Reverse(e.created_at));
    recent
        .into_iter()
        .take(limit)
        .map(|e| ActivityItem {
            id: e.id.clone(),
            actor: e
                .actor
                .clone()
                .unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
            occurred_at: e.created_at,
            payload: EventPayload::from_row(e),
        })
        .collect()
}

/// Window lengths used when composing an [`AggregateView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateWindows {
    pub usage_window_hours: u32,
    pub activity_lookback_hours: u32,
}

impl Default for AggregateWindows {
    fn default() -> Self {
        Self {
            usage_window_hours: DEFAULT_USAGE_WINDOW_HOURS,
            activity_lookback_hours: DEFAULT_ACTIVITY_LOOKBACK_HOURS,
        }
    }
}

/// Rows partitioned by the tables an aggregate view reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateInputs {
    pub runs: Vec<ServiceRunRow>,
    pub usage: Vec<UsageRow>,
    pub events: Vec<EventRow>,
}

impl AggregateInputs {
    /// Partition a mixed row set; rows from other tables are ignored
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut inputs = Self::default();
        for row in rows {
            match row {
                Row::ServiceRun(r) => inputs.runs.push(r),
                Row::Usage(r) => inputs.usage.push(r),
                Row::Event(r) => inputs.events.push(r),
                _ => {}
            }
        }
        inputs
    }
}

pub fn build_aggregate_view(
    inputs: &AggregateInputs,
    windows: AggregateWindows,
    now: DateTime<Utc>,
) -> AggregateView {
    AggregateView {
        latest_by_service: latest_runs(&inputs.runs),
        usage_summary: usage_summary(
            &inputs.usage,
            Duration::hours(i64::from(windows.usage_window_hours)),
            now,
        ),
        counts_by_actor: counts_by_actor(
            &inputs.events,
            Duration::hours(i64::from(windows.activity_lookback_hours)),
            now,
        ),
    }
}
