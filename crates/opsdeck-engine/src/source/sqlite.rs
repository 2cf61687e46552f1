//! SQLite-backed row source
//!
//! rusqlite connections are blocking and not `Sync`, so queries run on the
//! blocking pool behind a mutex.

use super::RowSource;
use async_trait::async_trait;
use opsdeck_core::errors::{ExError, ExErrorKind, Result};
use opsdeck_core::filter::{RowPage, RowRequest};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteRowSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRowSource {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open (creating if needed) and migrate the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(opsdeck_store::db::open_and_migrate(path)?))
    }
}

#[async_trait]
impl RowSource for SqliteRowSource {
    async fn fetch(&self, request: &RowRequest) -> Result<RowPage> {
        let conn = Arc::clone(&self.conn);
        let request = request.clone();
        tokio::task::spawn_blocking(move || -> Result<RowPage> {
            let conn = conn.lock().map_err(|_| {
                ExError::new(ExErrorKind::Concurrency)
                    .with_op("query_rows")
                    .with_message("store connection lock poisoned")
            })?;
            opsdeck_store::query_rows(&conn, &request)
        })
        .await
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("query_rows")
                .with_message(format!("blocking task failed: {}", e))
        })?
    }
}
