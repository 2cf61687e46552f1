//! In-memory row source.
//!
//! Evaluates Tier 1 predicates with the same reference semantics the SQLite
//! translation follows, including the exact count and the sort hint.

use super::RowSource;
use async_trait::async_trait;
use opsdeck_core::errors::Result;
use opsdeck_core::filter::{FilterPipeline, RowPage, RowRequest};
use opsdeck_core::model::Row;
use opsdeck_core::sort::sort_rows;
use opsdeck_core::SortKey;

#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    rows: Vec<Row>,
}

impl MemoryRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Synchronous form of [`RowSource::fetch`]
    pub fn query(&self, request: &RowRequest) -> Result<RowPage> {
        request.validate()?;

        let in_table: Vec<Row> = self
            .rows
            .iter()
            .filter(|r| r.table() == request.table)
            .cloned()
            .collect();
        let mut matched = FilterPipeline::apply_server_tier(in_table, &request.predicates);
        sort_rows(&mut matched, request.sort_hint.unwrap_or(SortKey::Date));

        let count = matched.len() as u64;
        let offset = usize::try_from(request.offset).unwrap_or(usize::MAX);
        let rows = matched
            .into_iter()
            .skip(offset)
            .take(request.limit as usize)
            .collect();
        Ok(RowPage {
            rows,
            count: Some(count),
        })
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn fetch(&self, request: &RowRequest) -> Result<RowPage> {
        self.query(request)
    }
}
