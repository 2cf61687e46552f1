//! Mapping between SQLite rows and the core row model.
//!
//! Columns are read by position in `RowTable::columns()` order.

use crate::errors::{from_rusqlite, Result};
use chrono::{DateTime, Utc};
use opsdeck_core::model::{
    ContactRow, EmailRow, EventRow, JobRow, Row, RowTable, ServiceRunRow, UsageRow,
};
use rusqlite::types::Type;
use rusqlite::Connection;
use serde_json::Value;

fn millis(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {}", ms).into(),
        )
    })
}

/// Stored payloads that are not valid JSON are kept as a JSON string
fn payload(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

pub(crate) fn map_row(table: RowTable, row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok(match table {
        RowTable::Jobs => Row::Job(JobRow {
            id: row.get(0)?,
            title: row.get(1)?,
            company: row.get(2)?,
            location: row.get(3)?,
            status: row.get(4)?,
            source: row.get(5)?,
            category: row.get(6)?,
            score: row.get(7)?,
            created_at: millis(row, 8)?,
        }),
        RowTable::Emails => Row::Email(EmailRow {
            id: row.get(0)?,
            subject: row.get(1)?,
            sender: row.get(2)?,
            recipient: row.get(3)?,
            status: row.get(4)?,
            category: row.get(5)?,
            created_at: millis(row, 6)?,
        }),
        RowTable::Contacts => Row::Contact(ContactRow {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            message: row.get(3)?,
            status: row.get(4)?,
            created_at: millis(row, 5)?,
        }),
        RowTable::ServiceRuns => Row::ServiceRun(ServiceRunRow {
            id: row.get(0)?,
            service: row.get(1)?,
            status: row.get(2)?,
            duration_ms: row.get(3)?,
            started_at: millis(row, 4)?,
        }),
        RowTable::Events => Row::Event(EventRow {
            id: row.get(0)?,
            actor: row.get(1)?,
            event_type: row.get(2)?,
            payload: payload(row.get(3)?),
            created_at: millis(row, 4)?,
        }),
        RowTable::UsageRecords => Row::Usage(UsageRow {
            id: row.get(0)?,
            model: row.get(1)?,
            service: row.get(2)?,
            input_tokens: row.get(3)?,
            output_tokens: row.get(4)?,
            cost: row.get(5)?,
            created_at: millis(row, 6)?,
        }),
    })
}

/// Insert a row. Tables are append-only: an existing id is left untouched
/// and `false` is returned.
pub fn insert_row(conn: &Connection, row: &Row) -> Result<bool> {
    let changed = match row {
        Row::Job(r) => conn.execute(
            "INSERT INTO jobs (id, title, company, location, status, source, category, score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![
                r.id,
                r.title,
                r.company,
                r.location,
                r.status,
                r.source,
                r.category,
                r.score,
                r.created_at.timestamp_millis(),
            ],
        ),
        Row::Email(r) => conn.execute(
            "INSERT INTO emails (id, subject, sender, recipient, status, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![
                r.id,
                r.subject,
                r.sender,
                r.recipient,
                r.status,
                r.category,
                r.created_at.timestamp_millis(),
            ],
        ),
        Row::Contact(r) => conn.execute(
            "INSERT INTO contacts (id, name, email, message, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![
                r.id,
                r.name,
                r.email,
                r.message,
                r.status,
                r.created_at.timestamp_millis(),
            ],
        ),
        Row::ServiceRun(r) => conn.execute(
            "INSERT INTO service_runs (id, service, status, duration_ms, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![
                r.id,
                r.service,
                r.status,
                r.duration_ms,
                r.started_at.timestamp_millis(),
            ],
        ),
        Row::Event(r) => conn.execute(
            "INSERT INTO events (id, actor, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![
                r.id,
                r.actor,
                r.event_type,
                r.payload.to_string(),
                r.created_at.timestamp_millis(),
            ],
        ),
        Row::Usage(r) => conn.execute(
            "INSERT INTO usage_records (id, model, service, input_tokens, output_tokens, cost, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![
                r.id,
                r.model,
                r.service,
                r.input_tokens,
                r.output_tokens,
                r.cost,
                r.created_at.timestamp_millis(),
            ],
        ),
    }
    .map_err(from_rusqlite)?;

    Ok(changed > 0)
}
