//! View queries and the per-view session.
//!
//! When the filter has no client-side predicates, limit and offset go to
//! the row source and its count is exact. Otherwise the full Tier 1 match
//! set is scanned (up to `max_scan_rows`) before Tier 2 runs, so a page
//! never hides matches that sit beyond the store's page boundary.

use crate::config::QueryConfig;
use crate::source::{fetch_all, RowSource};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use opsdeck_core::coordinator::{Debouncer, QueryCoordinator, Resolution, ViewState};
use opsdeck_core::errors::Result;
use opsdeck_core::filter::{FilterPipeline, RowRequest};
use opsdeck_core::model::{FilterState, Row, RowTable};
use opsdeck_core::sort::sorted;
use opsdeck_core::{log_op_end, log_op_error, log_op_start, Clock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// One page of a filtered, sorted view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult {
    pub table: RowTable,
    pub rows: Vec<Row>,
    pub page: u64,
    pub page_size: u32,
    /// Total matches across all pages, when known
    pub total: Option<u64>,
    /// The scan cap was hit; `total` counts only scanned rows
    pub truncated: bool,
}

/// Fetch page `page` of `table` under `filter`
pub async fn fetch_view(
    source: &dyn RowSource,
    table: RowTable,
    filter: &FilterState,
    page: u64,
    query: &QueryConfig,
    now: DateTime<Utc>,
) -> Result<ViewResult> {
    log_op_start!("fetch_view", table = table.as_str(), page = page);
    let start = Instant::now();

    match fetch_view_impl(source, table, filter, page, query, now).await {
        Ok(result) => {
            log_op_end!(
                "fetch_view",
                duration_ms = start.elapsed().as_millis() as u64,
                row_count = result.rows.len() as u64,
                truncated = result.truncated
            );
            Ok(result)
        }
        Err(e) => {
            log_op_error!(
                "fetch_view",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(e)
        }
    }
}

async fn fetch_view_impl(
    source: &dyn RowSource,
    table: RowTable,
    filter: &FilterState,
    page: u64,
    query: &QueryConfig,
    now: DateTime<Utc>,
) -> Result<ViewResult> {
    let tier1 = FilterPipeline::server_tier(filter, table)?;
    let tier2 = FilterPipeline::client_tier(filter, now);
    let base = RowRequest::new(table)
        .with_predicates(tier1)
        .with_sort_hint(filter.sort_key);
    let page_size = query.page_size.max(1);
    let offset = page.saturating_mul(u64::from(page_size));

    if tier2.is_empty() {
        let fetched = source.fetch(&base.with_page(page_size, offset)).await?;
        return Ok(ViewResult {
            table,
            rows: sorted(fetched.rows, filter.sort_key),
            page,
            page_size,
            total: fetched.count,
            truncated: false,
        });
    }

    let scan = fetch_all(source, &base, page_size, query.max_scan_rows).await?;
    if scan.truncated {
        tracing::warn!(
            op = "fetch_view",
            table = table.as_str(),
            max_scan_rows = query.max_scan_rows,
            "scan cap reached, client-side filtering is partial"
        );
    }
    let matched = sorted(
        FilterPipeline::apply_client_tier(scan.rows, &tier2),
        filter.sort_key,
    );
    let total = matched.len() as u64;
    let rows = matched
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(page_size as usize)
        .collect();

    Ok(ViewResult {
        table,
        rows,
        page,
        page_size,
        total: Some(total),
        truncated: scan.truncated,
    })
}

type InFlight = BoxFuture<'static, (u64, Result<ViewResult>)>;

/// One live view: current filter, in-flight fetches and the visible result.
///
/// Every filter change dispatches a new tagged fetch; fetches run
/// concurrently and are resolved in completion order, and only the latest
/// dispatched one can change what is visible. Free-text search goes through
/// a debouncer first.
pub struct ViewSession {
    table: RowTable,
    source: Arc<dyn RowSource>,
    clock: Arc<dyn Clock>,
    query: QueryConfig,
    filter: FilterState,
    page: u64,
    coordinator: QueryCoordinator<ViewResult>,
    search: Debouncer<String>,
    in_flight: FuturesUnordered<InFlight>,
}

/// Debounce deadlines follow tokio's clock so paused-time tests drive them
fn now_instant() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl ViewSession {
    pub fn new(
        table: RowTable,
        source: Arc<dyn RowSource>,
        clock: Arc<dyn Clock>,
        query: QueryConfig,
    ) -> Self {
        Self {
            table,
            source,
            clock,
            query,
            filter: FilterState::default(),
            page: 0,
            coordinator: QueryCoordinator::new(table.as_str()),
            search: Debouncer::new(query.debounce()),
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn table(&self) -> RowTable {
        self.table
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn state(&self) -> &ViewState<ViewResult> {
        self.coordinator.state()
    }

    pub fn visible(&self) -> Option<&ViewResult> {
        self.coordinator.visible()
    }

    pub fn current_sequence(&self) -> u64 {
        self.coordinator.current_sequence()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Replace the filter and dispatch. Invalid filters are rejected here
    /// and never reach the row source.
    pub fn set_filter(&mut self, filter: FilterState) -> Result<u64> {
        FilterPipeline::server_tier(&filter, self.table)?;
        self.filter = filter;
        self.page = 0;
        Ok(self.dispatch())
    }

    pub fn set_page(&mut self, page: u64) -> u64 {
        self.page = page;
        self.dispatch()
    }

    /// Re-run the current filter
    pub fn refresh(&mut self) -> u64 {
        self.dispatch()
    }

    /// Record a keystroke in the search box; restarts the debounce delay
    pub fn type_search(&mut self, text: impl Into<String>) {
        self.search.input(text.into(), now_instant());
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Dispatch the pending search text if its delay has elapsed
    pub fn poll_search(&mut self) -> Option<u64> {
        let text = self.search.poll(now_instant())?;
        self.filter = self.filter.clone().with_search(text);
        self.page = 0;
        Some(self.dispatch())
    }

    /// Sleep until the pending search is due, then dispatch it
    pub async fn wait_for_search(&mut self) -> Option<u64> {
        loop {
            let deadline = self.search.deadline()?;
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            if let Some(sequence) = self.poll_search() {
                return Some(sequence);
            }
        }
    }

    fn dispatch(&mut self) -> u64 {
        let request = self.coordinator.dispatch(self.filter.clone());
        let sequence = request.sequence;
        let source = Arc::clone(&self.source);
        let table = self.table;
        let page = self.page;
        let query = self.query;
        let now = self.clock.now();

        self.in_flight.push(
            async move {
                let result = fetch_view(&*source, table, &request.filter, page, &query, now)
                    .await
                    .map_err(|e| e.with_request_id(request.context.request_id.clone()));
                (sequence, result)
            }
            .boxed(),
        );
        sequence
    }

    /// Wait for the next fetch to complete and apply or discard it.
    /// Returns `None` when nothing is in flight.
    pub async fn next_resolution(&mut self) -> Option<(u64, Resolution)> {
        let (sequence, result) = self.in_flight.next().await?;
        Some((sequence, self.coordinator.resolve(sequence, result)))
    }

    /// Resolve everything in flight
    pub async fn settle(&mut self) -> &ViewState<ViewResult> {
        while self.next_resolution().await.is_some() {}
        self.coordinator.state()
    }
}
