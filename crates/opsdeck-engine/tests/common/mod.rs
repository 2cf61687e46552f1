#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use opsdeck_core::errors::{ExError, ExErrorKind, Result};
use opsdeck_core::filter::{RowPage, RowRequest, Tier1Predicate};
use opsdeck_core::model::{EventRow, JobRow, Row, RowTable, ServiceRunRow, UsageRow};
use opsdeck_engine::{MemoryRowSource, RowSource};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

pub fn job(id: &str, location: &str, score: f64, hours_ago: i64) -> Row {
    Row::Job(JobRow {
        id: id.to_string(),
        title: format!("Role {id}"),
        company: Some("Acme".to_string()),
        location: Some(location.to_string()),
        status: Some("new".to_string()),
        source: Some("board".to_string()),
        category: None,
        score: Some(score),
        created_at: fixed_now() - Duration::hours(hours_ago),
    })
}

pub fn run(id: &str, service: &str, status: &str, hours_ago: i64) -> Row {
    Row::ServiceRun(ServiceRunRow {
        id: id.to_string(),
        service: Some(service.to_string()),
        status: Some(status.to_string()),
        duration_ms: Some(100),
        started_at: fixed_now() - Duration::hours(hours_ago),
    })
}

pub fn usage(id: &str, model: &str, cost: f64, hours_ago: i64) -> Row {
    Row::Usage(UsageRow {
        id: id.to_string(),
        model: Some(model.to_string()),
        service: None,
        input_tokens: None,
        output_tokens: None,
        cost: Some(cost),
        created_at: fixed_now() - Duration::hours(hours_ago),
    })
}

pub fn event(id: &str, actor: &str, hours_ago: i64) -> Row {
    Row::Event(EventRow {
        id: id.to_string(),
        actor: Some(actor.to_string()),
        event_type: "heartbeat".to_string(),
        payload: serde_json::Value::Null,
        created_at: fixed_now() - Duration::hours(hours_ago),
    })
}

/// Row source with per-search-text latency and injectable failures
#[derive(Default)]
pub struct ScriptedSource {
    inner: MemoryRowSource,
    delays: HashMap<String, std::time::Duration>,
    failing_searches: HashSet<String>,
    failing_tables: HashSet<RowTable>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            inner: MemoryRowSource::new(rows),
            ..Default::default()
        }
    }

    pub fn delay(mut self, search: &str, millis: u64) -> Self {
        self.delays.insert(
            search.to_string(),
            std::time::Duration::from_millis(millis),
        );
        self
    }

    pub fn fail_search(mut self, search: &str) -> Self {
        self.failing_searches.insert(search.to_string());
        self
    }

    pub fn fail_table(mut self, table: RowTable) -> Self {
        self.failing_tables.insert(table);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn search_text(request: &RowRequest) -> String {
    request
        .predicates
        .iter()
        .find_map(|p| match p {
            Tier1Predicate::SearchAny { text, .. } => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

#[async_trait]
impl RowSource for ScriptedSource {
    async fn fetch(&self, request: &RowRequest) -> Result<RowPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let search = search_text(request);
        if let Some(delay) = self.delays.get(&search) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_searches.contains(&search) || self.failing_tables.contains(&request.table)
        {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("fetch")
                .with_message("scripted failure"));
        }
        self.inner.fetch(request).await
    }
}
