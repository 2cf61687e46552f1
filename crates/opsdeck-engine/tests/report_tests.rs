#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{TimeZone, Utc};
use common::{event, fixed_now, run, usage, ScriptedSource};
use opsdeck_core::errors::ExErrorKind;
use opsdeck_core::model::{EventPayload, RowTable};
use opsdeck_engine::config::{DashboardConfig, QueryConfig};
use opsdeck_engine::{build_report, HealthChecker, SqliteRowSource};
use std::path::PathBuf;
use tempfile::TempDir;

fn seed_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../opsdeck-store/tests/fixtures/seed_small.yaml")
}

fn seeded_source(dir: &TempDir) -> SqliteRowSource {
    let db_path = dir.path().join("opsdeck.db");
    let mut conn = opsdeck_store::db::open_and_migrate(&db_path).unwrap();
    opsdeck_store::seed::import_seed(&seed_fixture(), &mut conn).unwrap();
    SqliteRowSource::new(conn)
}

#[tokio::test]
async fn test_report_over_seeded_store() {
    let dir = TempDir::new().unwrap();
    let source = seeded_source(&dir);
    let now = Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap();

    let report = build_report(
        &source,
        &HealthChecker::new().unwrap(),
        &[],
        &QueryConfig::default(),
        &DashboardConfig::default(),
        now,
    )
    .await;

    assert!(report.failed_sections().is_empty());
    let view = report.aggregate_view().unwrap();

    let mailer = &view.latest_by_service["mailer"];
    assert_eq!(mailer.status, "failed");
    assert_eq!(mailer.duration_ms, 300);
    let crawler = &view.latest_by_service["crawler"];
    assert_eq!(crawler.status, "ok");
    assert_eq!(crawler.duration_ms, 0);

    let usage = &view.usage_summary;
    assert_eq!(usage.total_calls, 2);
    assert!((usage.total_cost - 1.75).abs() < 1e-9);
    assert!((usage.last_7d_cost - 0.25).abs() < 1e-9);
    let models: Vec<&str> = usage.by_model.iter().map(|m| m.model.as_str()).collect();
    assert_eq!(models, vec!["large", "small"]);

    let actors: Vec<(&str, u64)> = view
        .counts_by_actor
        .iter()
        .map(|a| (a.actor.as_str(), a.count))
        .collect();
    assert_eq!(actors, vec![("crawler", 1), ("mailer", 1)]);

    let feed = report.recent_activity.data.as_ref().unwrap();
    let feed_ids: Vec<&str> = feed.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(feed_ids, vec!["evt-2", "evt-1"]);
    assert!(feed[0].payload.is_unknown());
    assert_eq!(
        feed[1].payload,
        EventPayload::JobDiscovered {
            job_id: "job-1".to_string(),
            title: "Senior Rust Engineer".to_string(),
        }
    );
    assert!(report.health.is_empty());
}

#[tokio::test]
async fn test_failed_section_does_not_blank_the_others() {
    let source = ScriptedSource::new(vec![
        run("r1", "mailer", "ok", 1),
        usage("u1", "small", 0.5, 1),
        event("e1", "crawler", 1),
        event("e2", "crawler", 2),
        event("e3", "mailer", 3),
    ])
    .fail_table(RowTable::UsageRecords);

    let report = build_report(
        &source,
        &HealthChecker::new().unwrap(),
        &[],
        &QueryConfig::default(),
        &DashboardConfig::default(),
        fixed_now(),
    )
    .await;

    assert_eq!(report.failed_sections(), vec!["usage_summary"]);
    assert!(report.aggregate_view().is_none());

    let error = report.usage_summary.error.as_ref().unwrap();
    assert_eq!(error.code, ExErrorKind::ExternalService.code());
    assert!(report.latest_by_service.data.as_ref().unwrap().contains_key("mailer"));

    let actors = report.counts_by_actor.data.as_ref().unwrap();
    assert_eq!(actors[0].actor, "crawler");
    assert_eq!(actors[0].count, 2);
}

#[tokio::test]
async fn test_activity_outside_lookback_is_excluded() {
    let source = ScriptedSource::new(vec![
        event("recent", "crawler", 2),
        event("stale", "mailer", 30),
    ]);

    let report = build_report(
        &source,
        &HealthChecker::new().unwrap(),
        &[],
        &QueryConfig::default(),
        &DashboardConfig::default(),
        fixed_now(),
    )
    .await;

    let actors = report.counts_by_actor.data.unwrap();
    assert_eq!(actors.len(), 1);
    assert_eq!(actors[0].actor, "crawler");
}

#[tokio::test]
async fn test_unbounded_lookback_saturates_instead_of_overflowing() {
    let source = ScriptedSource::new(vec![
        event("recent", "crawler", 2),
        event("stale", "mailer", 30),
    ]);
    let dashboard = DashboardConfig {
        activity_lookback_hours: u32::MAX,
        usage_window_hours: u32::MAX,
        ..DashboardConfig::default()
    };

    let report = build_report(
        &source,
        &HealthChecker::new().unwrap(),
        &[],
        &QueryConfig::default(),
        &dashboard,
        fixed_now(),
    )
    .await;

    let actors = report.counts_by_actor.data.unwrap();
    assert_eq!(actors.len(), 2);
    assert_eq!(report.recent_activity.data.unwrap().len(), 2);
}

#[tokio::test]
async fn test_section_cap_marks_truncation() {
    let rows = (0..30)
        .map(|i| usage(&format!("u{i}"), "small", 0.1, i))
        .collect();
    let source = ScriptedSource::new(rows);
    let query = QueryConfig {
        page_size: 10,
        ..QueryConfig::default()
    };
    let dashboard = DashboardConfig {
        max_rows_per_section: 20,
        ..DashboardConfig::default()
    };

    let report = build_report(
        &source,
        &HealthChecker::new().unwrap(),
        &[],
        &query,
        &dashboard,
        fixed_now(),
    )
    .await;

    assert!(report.usage_summary.truncated);
    assert_eq!(report.usage_summary.data.unwrap().total_calls, 20);
    assert!(!report.latest_by_service.truncated);
}
