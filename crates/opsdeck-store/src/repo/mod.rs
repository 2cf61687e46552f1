//! Row source over SQLite
//!
//! `query_rows` is the store side of the row source contract: a
//! `RowRequest` in, a `RowPage` with an exact count out.

mod mapping;
mod sql;

pub use mapping::insert_row;
pub use sql::{build_query, SqlQuery};

use crate::errors::{from_rusqlite, Result};
use opsdeck_core::filter::{RowPage, RowRequest};
use opsdeck_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::Connection;
use std::time::Instant;

/// Fetch one page of rows plus the total number of matches
pub fn query_rows(conn: &Connection, request: &RowRequest) -> Result<RowPage> {
    log_op_start!("query_rows", table = request.table.as_str());
    let start = Instant::now();

    let page = query_rows_impl(conn, request).map_err(|e| {
        log_op_error!(
            "query_rows",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "query_rows",
        duration_ms = start.elapsed().as_millis() as u64,
        row_count = page.rows.len() as u64
    );
    Ok(page)
}

fn query_rows_impl(conn: &Connection, request: &RowRequest) -> Result<RowPage> {
    let query = build_query(request)?;

    let count: i64 = conn
        .query_row(
            &query.count_sql,
            rusqlite::params_from_iter(query.filter_params.iter()),
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;

    let mut stmt = conn.prepare(&query.select_sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(query.select_params().iter()),
            |row| mapping::map_row(request.table, row),
        )
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(RowPage {
        rows,
        count: Some(count.max(0) as u64),
    })
}
