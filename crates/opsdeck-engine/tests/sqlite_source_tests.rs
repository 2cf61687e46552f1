#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeZone, Utc};
use opsdeck_core::model::{FilterState, LocationBucket, RowTable, SortKey};
use opsdeck_core::FixedClock;
use opsdeck_engine::config::QueryConfig;
use opsdeck_engine::{fetch_view, SqliteRowSource, ViewSession};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn source(dir: &TempDir) -> SqliteRowSource {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../opsdeck-store/tests/fixtures/seed_small.yaml");
    let source = SqliteRowSource::open(dir.path().join("data/opsdeck.db")).unwrap();
    let mut conn = opsdeck_store::db::open(dir.path().join("data/opsdeck.db")).unwrap();
    opsdeck_store::seed::import_seed(&fixture, &mut conn).unwrap();
    source
}

fn ids(rows: &[opsdeck_core::Row]) -> Vec<&str> {
    rows.iter().map(|r| r.id()).collect()
}

#[tokio::test]
async fn test_search_with_comma_and_wildcard_is_literal() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir);
    let now = Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap();
    let query = QueryConfig::default();

    let hooli = FilterState::default().with_search("Hooli, Inc");
    let result = fetch_view(&source, RowTable::Jobs, &hooli, 0, &query, now)
        .await
        .unwrap();
    assert_eq!(ids(&result.rows), vec!["job-2"]);

    let percent = FilterState::default().with_search("100%");
    let result = fetch_view(&source, RowTable::Jobs, &percent, 0, &query, now)
        .await
        .unwrap();
    assert_eq!(ids(&result.rows), vec!["job-3"]);

    let underscore = FilterState::default().with_search("pricing_plan");
    let result = fetch_view(&source, RowTable::Contacts, &underscore, 0, &query, now)
        .await
        .unwrap();
    assert_eq!(ids(&result.rows), vec!["contact-1"]);
}

#[tokio::test]
async fn test_session_over_sqlite_applies_both_tiers() {
    let dir = TempDir::new().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap();
    let mut view = ViewSession::new(
        RowTable::Jobs,
        Arc::new(source(&dir)),
        Arc::new(FixedClock(now)),
        QueryConfig::default(),
    );

    view.set_filter(
        FilterState::default()
            .with_location(LocationBucket::Remote)
            .with_sort(SortKey::Score),
    )
    .unwrap();
    view.settle().await;

    let visible = view.visible().unwrap();
    assert_eq!(ids(&visible.rows), vec!["job-1"]);
    assert_eq!(visible.total, Some(1));
}

#[tokio::test]
async fn test_priority_sort_from_store() {
    let dir = TempDir::new().unwrap();
    let source = source(&dir);
    let now = Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap();

    let filter = FilterState::default().with_sort(SortKey::Priority);
    let result = fetch_view(&source, RowTable::Jobs, &filter, 0, &QueryConfig::default(), now)
        .await
        .unwrap();
    assert_eq!(ids(&result.rows), vec!["job-3", "job-1", "job-2"]);
    assert_eq!(result.total, Some(3));
}
