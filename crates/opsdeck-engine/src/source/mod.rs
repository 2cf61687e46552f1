//! The row source contract
//!
//! A `RowRequest` (table, Tier 1 predicates, sort hint, limit, offset) in,
//! a `RowPage` (rows plus an optional exact count) or an `ExError` out.

mod memory;
mod sqlite;

pub use memory::MemoryRowSource;
pub use sqlite::SqliteRowSource;

use async_trait::async_trait;
use opsdeck_core::errors::Result;
use opsdeck_core::filter::{RowPage, RowRequest};

#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch(&self, request: &RowRequest) -> Result<RowPage>;
}

/// Rows collected by [`fetch_all`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub rows: Vec<opsdeck_core::model::Row>,
    /// True if matching rows were left unread because `cap` was reached
    pub truncated: bool,
}

/// Read every row matching `request`, `chunk` rows at a time, stopping at
/// `cap` rows. The request's own limit and offset are ignored.
pub async fn fetch_all(
    source: &dyn RowSource,
    request: &RowRequest,
    chunk: u32,
    cap: u64,
) -> Result<ScanResult> {
    let chunk = u64::from(chunk.max(1));
    let mut rows = Vec::new();
    let mut offset = 0u64;
    let mut known_count = None;

    loop {
        let remaining = cap.saturating_sub(offset);
        if remaining == 0 {
            // Without a count, a full final chunk means there may be more
            let truncated = known_count.map_or(true, |count| count > offset);
            return Ok(ScanResult { rows, truncated });
        }

        let limit = chunk.min(remaining);
        let page = source
            .fetch(&request.clone().with_page(limit as u32, offset))
            .await?;
        if known_count.is_none() {
            known_count = page.count;
        }
        let got = page.rows.len() as u64;
        rows.extend(page.rows);
        offset += got;

        if got < limit || known_count.is_some_and(|count| offset >= count) {
            return Ok(ScanResult {
                rows,
                truncated: false,
            });
        }
    }
}
