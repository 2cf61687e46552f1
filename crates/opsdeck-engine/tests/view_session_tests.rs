#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{fixed_now, job, ScriptedSource};
use opsdeck_core::coordinator::{Resolution, ViewState};
use opsdeck_core::errors::ExErrorKind;
use opsdeck_core::model::{LocationBucket, Row, RowTable, ScoreBand};
use opsdeck_core::{FilterState, FixedClock};
use opsdeck_engine::config::QueryConfig;
use opsdeck_engine::{fetch_view, MemoryRowSource, ViewSession};
use std::sync::Arc;
use std::time::Duration;

fn corpus() -> Vec<Row> {
    vec![
        job("alpha", "Remote", 9.0, 1),
        job("beta", "London, UK", 7.0, 2),
        job("gamma", "Berlin", 5.0, 3),
    ]
}

fn session(source: ScriptedSource) -> ViewSession {
    ViewSession::new(
        RowTable::Jobs,
        Arc::new(source),
        Arc::new(FixedClock(fixed_now())),
        QueryConfig::default(),
    )
}

fn visible_ids(session: &ViewSession) -> Vec<String> {
    session
        .visible()
        .map(|v| v.rows.iter().map(|r| r.id().to_string()).collect())
        .unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn test_later_dispatch_wins_when_earlier_resolves_last() {
    let source = ScriptedSource::new(corpus())
        .delay("alpha", 500)
        .delay("beta", 10);
    let mut view = session(source);

    view.set_filter(FilterState::default().with_search("alpha")).unwrap();
    view.set_filter(FilterState::default().with_search("beta")).unwrap();
    assert_eq!(view.in_flight(), 2);

    let first = view.next_resolution().await.unwrap();
    assert_eq!(first, (2, Resolution::Applied));
    let second = view.next_resolution().await.unwrap();
    assert_eq!(second, (1, Resolution::Superseded));

    assert_eq!(visible_ids(&view), vec!["beta"]);
}

#[tokio::test(start_paused = true)]
async fn test_reverse_resolution_order_applies_only_last_dispatched() {
    // Earlier requests are slower, so they resolve in reverse dispatch order
    let searches = ["role", "rol", "ro", "r", "alpha"];
    let mut source = ScriptedSource::new(corpus());
    for (i, s) in searches.iter().enumerate() {
        source = source.delay(s, 100 * (searches.len() - i) as u64);
    }
    let mut view = session(source);

    for s in searches {
        view.set_filter(FilterState::default().with_search(s)).unwrap();
    }

    let mut outcomes = Vec::new();
    while let Some(outcome) = view.next_resolution().await {
        outcomes.push(outcome);
    }
    assert_eq!(
        outcomes,
        vec![
            (5, Resolution::Applied),
            (4, Resolution::Superseded),
            (3, Resolution::Superseded),
            (2, Resolution::Superseded),
            (1, Resolution::Superseded),
        ]
    );
    assert_eq!(visible_ids(&view), vec!["alpha"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_does_not_clobber_newer_success() {
    let source = ScriptedSource::new(corpus())
        .delay("broken", 300)
        .fail_search("broken");
    let mut view = session(source);

    view.set_filter(FilterState::default().with_search("broken")).unwrap();
    view.set_filter(FilterState::default().with_search("gamma")).unwrap();
    let state = view.settle().await;

    assert!(matches!(state, ViewState::Loaded { sequence: 2, .. }));
    assert_eq!(visible_ids(&view), vec!["gamma"]);
}

#[tokio::test(start_paused = true)]
async fn test_current_failure_is_surfaced_with_request_id() {
    let source = ScriptedSource::new(corpus()).fail_search("broken");
    let mut view = session(source);

    view.set_filter(FilterState::default().with_search("broken")).unwrap();
    let state = view.settle().await;

    let err = state.error().unwrap();
    assert_eq!(err.kind(), ExErrorKind::ExternalService);
    assert!(err.request_id().is_some());
    assert!(view.visible().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_filter_is_never_dispatched() {
    let source = Arc::new(ScriptedSource::new(corpus()));
    let mut view = ViewSession::new(
        RowTable::Emails,
        source.clone(),
        Arc::new(FixedClock(fixed_now())),
        QueryConfig::default(),
    );

    let err = view
        .set_filter(FilterState::default().with_score_band(ScoreBand::High))
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::UnsupportedFilter);
    assert_eq!(view.current_sequence(), 0);
    assert_eq!(view.in_flight(), 0);
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_search_is_debounced_to_last_keystroke() {
    let source = Arc::new(ScriptedSource::new(corpus()));
    let mut view = ViewSession::new(
        RowTable::Jobs,
        source.clone(),
        Arc::new(FixedClock(fixed_now())),
        QueryConfig::default(),
    );

    let started = tokio::time::Instant::now();
    view.type_search("a");
    tokio::time::advance(Duration::from_millis(100)).await;
    view.type_search("al");
    tokio::time::advance(Duration::from_millis(100)).await;
    view.type_search("alp");
    assert_eq!(view.poll_search(), None);

    let sequence = view.wait_for_search().await;
    assert_eq!(sequence, Some(1));
    assert_eq!(view.filter().search_text, "alp");
    assert!(started.elapsed() >= Duration::from_millis(500));

    view.settle().await;
    assert_eq!(visible_ids(&view), vec!["alpha"]);
    assert_eq!(source.calls(), 1);
    assert_eq!(view.wait_for_search().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_same_filter_twice_is_idempotent() {
    let mut view = session(ScriptedSource::new(corpus()));
    let filter = FilterState::default().with_location(LocationBucket::Remote);

    view.set_filter(filter.clone()).unwrap();
    view.settle().await;
    let first = view.visible().cloned();

    view.set_filter(filter).unwrap();
    view.settle().await;
    assert_eq!(view.visible().cloned(), first);
    assert!(first.is_some());
}

fn many_jobs() -> Vec<Row> {
    // 120 jobs; only the oldest five are remote
    (0..120)
        .map(|i| {
            let location = if i >= 115 { "Remote" } else { "Paris" };
            job(&format!("job-{i:03}"), location, 5.0, i)
        })
        .collect()
}

#[tokio::test]
async fn test_client_filter_sees_rows_beyond_first_page() {
    let source = MemoryRowSource::new(many_jobs());
    let query = QueryConfig {
        page_size: 50,
        ..QueryConfig::default()
    };
    let filter = FilterState::default().with_location(LocationBucket::Remote);

    let result = fetch_view(&source, RowTable::Jobs, &filter, 0, &query, fixed_now())
        .await
        .unwrap();
    assert_eq!(result.total, Some(5));
    assert!(!result.truncated);
    assert_eq!(result.rows.len(), 5);
    assert_eq!(result.rows[0].id(), "job-115");
}

#[tokio::test]
async fn test_scan_cap_is_reported() {
    let source = MemoryRowSource::new(many_jobs());
    let query = QueryConfig {
        page_size: 50,
        max_scan_rows: 60,
        ..QueryConfig::default()
    };
    let filter = FilterState::default().with_location(LocationBucket::Remote);

    let result = fetch_view(&source, RowTable::Jobs, &filter, 0, &query, fixed_now())
        .await
        .unwrap();
    assert!(result.truncated);
    assert_eq!(result.total, Some(0));
}

#[tokio::test]
async fn test_server_only_filter_pushes_pagination_down() {
    let source = MemoryRowSource::new(many_jobs());
    let query = QueryConfig {
        page_size: 50,
        ..QueryConfig::default()
    };

    let result = fetch_view(
        &source,
        RowTable::Jobs,
        &FilterState::default(),
        2,
        &query,
        fixed_now(),
    )
    .await
    .unwrap();
    assert_eq!(result.total, Some(120));
    assert_eq!(result.rows.len(), 20);
    assert_eq!(result.rows[0].id(), "job-100");
}
