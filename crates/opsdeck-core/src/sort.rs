//! Deterministic multi-key ordering of row sets.
//!
//! All sorts are stable: rows that compare equal keep their input order.

use crate::aggregate::DEFAULT_SCORE;
use crate::model::{Row, SortKey};
use std::cmp::Ordering;

/// Rank given to statuses missing from the priority map
pub const UNRANKED: u32 = 99;

/// Workflow statuses in priority order, most urgent first
pub const STATUS_PRIORITY: &[(&str, u32)] = &[
    ("offer", 0),
    ("interviewing", 1),
    ("applied", 2),
    ("approved", 3),
    ("new", 4),
    ("pending", 5),
    ("reviewed", 6),
    ("rejected", 7),
    ("archived", 8),
];

pub fn status_rank(status: Option<&str>) -> u32 {
    status
        .and_then(|s| {
            STATUS_PRIORITY
                .iter()
                .find(|(name, _)| *name == s)
                .map(|(_, rank)| *rank)
        })
        .unwrap_or(UNRANKED)
}

/// Comparator for one sort key
pub fn compare(key: SortKey, a: &Row, b: &Row) -> Ordering {
    match key {
        SortKey::Priority => status_rank(a.status())
            .cmp(&status_rank(b.status()))
            .then_with(|| b.occurred_at().cmp(&a.occurred_at())),
        SortKey::Date => b.occurred_at().cmp(&a.occurred_at()),
        SortKey::Score => {
            let sa = a.score().unwrap_or(DEFAULT_SCORE);
            let sb = b.score().unwrap_or(DEFAULT_SCORE);
            sb.total_cmp(&sa)
        }
        SortKey::Name => a.label().cmp(b.label()),
    }
}

/// Sort `rows` in place by `key`
pub fn sort_rows(rows: &mut [Row], key: SortKey) {
    rows.sort_by(|a, b| compare(key, a, b));
}

/// Owned variant of [`sort_rows`]
pub fn sorted(mut rows: Vec<Row>, key: SortKey) -> Vec<Row> {
    sort_rows(&mut rows, key);
    rows
}
