//! Row model for the append-only tables the dashboard reads.
//!
//! Rows are produced by out-of-band agents and are never mutated here. Every
//! variant exposes the same small accessor surface so the filter, sort and
//! aggregation stages can treat them uniformly.

use crate::errors::DashError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of tables a view can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowTable {
    Jobs,
    Emails,
    Contacts,
    ServiceRuns,
    Events,
    UsageRecords,
}

/// Filter fields whose support varies per table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Status,
    Source,
    Category,
    MinScore,
    ScoreBand,
    Location,
}

impl FilterField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Source => "source",
            Self::Category => "category",
            Self::MinScore => "min_score",
            Self::ScoreBand => "score_band",
            Self::Location => "location_bucket",
        }
    }
}

impl RowTable {
    pub const ALL: [RowTable; 6] = [
        RowTable::Jobs,
        RowTable::Emails,
        RowTable::Contacts,
        RowTable::ServiceRuns,
        RowTable::Events,
        RowTable::UsageRecords,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Emails => "emails",
            Self::Contacts => "contacts",
            Self::ServiceRuns => "service_runs",
            Self::Events => "events",
            Self::UsageRecords => "usage_records",
        }
    }

    /// Column holding the occurrence timestamp (unix millis in the store)
    pub fn time_column(self) -> &'static str {
        match self {
            Self::ServiceRuns => "started_at",
            _ => "created_at",
        }
    }

    /// Every column the store may filter or select on
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Jobs => &[
                "id",
                "title",
                "company",
                "location",
                "status",
                "source",
                "category",
                "score",
                "created_at",
            ],
            Self::Emails => &[
                "id",
                "subject",
                "sender",
                "recipient",
                "status",
                "category",
                "created_at",
            ],
            Self::Contacts => &["id", "name", "email", "message", "status", "created_at"],
            Self::ServiceRuns => &["id", "service", "status", "duration_ms", "started_at"],
            Self::Events => &["id", "actor", "event_type", "payload", "created_at"],
            Self::UsageRecords => &[
                "id",
                "model",
                "service",
                "input_tokens",
                "output_tokens",
                "cost",
                "created_at",
            ],
        }
    }

    /// Text columns OR-ed together by the free-text search predicate
    pub fn search_columns(self) -> &'static [&'static str] {
        match self {
            Self::Jobs => &["title", "company", "location"],
            Self::Emails => &["subject", "sender", "recipient"],
            Self::Contacts => &["name", "email", "message"],
            Self::ServiceRuns => &["service"],
            Self::Events => &["actor", "event_type"],
            Self::UsageRecords => &["model", "service"],
        }
    }

    /// Column the `name` sort orders by
    pub fn label_column(self) -> &'static str {
        match self {
            Self::Jobs => "title",
            Self::Emails => "subject",
            Self::Contacts => "name",
            Self::ServiceRuns => "service",
            Self::Events => "actor",
            Self::UsageRecords => "model",
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    pub fn supports(self, field: FilterField) -> bool {
        match field {
            FilterField::Status => self.has_column("status"),
            FilterField::Source => self.has_column("source"),
            FilterField::Category => self.has_column("category"),
            FilterField::MinScore | FilterField::ScoreBand => self.has_column("score"),
            FilterField::Location => self.has_column("location"),
        }
    }
}

impl fmt::Display for RowTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowTable {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowTable::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DashError::UnknownTable {
                table: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRow {
    pub id: String,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRow {
    pub id: String,
    pub subject: String,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A message submitted through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One execution of a monitored agent service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRunRow {
    pub id: String,
    pub service: Option<String>,
    pub status: Option<String>,
    pub duration_ms: Option<i64>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: String,
    pub actor: Option<String>,
    pub event_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One billed model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRow {
    pub id: String,
    pub model: Option<String>,
    pub service: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    Job(JobRow),
    Email(EmailRow),
    Contact(ContactRow),
    ServiceRun(ServiceRunRow),
    Event(EventRow),
    Usage(UsageRow),
}

impl Row {
    pub fn table(&self) -> RowTable {
        match self {
            Row::Job(_) => RowTable::Jobs,
            Row::Email(_) => RowTable::Emails,
            Row::Contact(_) => RowTable::Contacts,
            Row::ServiceRun(_) => RowTable::ServiceRuns,
            Row::Event(_) => RowTable::Events,
            Row::Usage(_) => RowTable::UsageRecords,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Row::Job(r) => &r.id,
            Row::Email(r) => &r.id,
            Row::Contact(r) => &r.id,
            Row::ServiceRun(r) => &r.id,
            Row::Event(r) => &r.id,
            Row::Usage(r) => &r.id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Row::Job(r) => r.created_at,
            Row::Email(r) => r.created_at,
            Row::Contact(r) => r.created_at,
            Row::ServiceRun(r) => r.started_at,
            Row::Event(r) => r.created_at,
            Row::Usage(r) => r.created_at,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            Row::Job(r) => r.status.as_deref(),
            Row::Email(r) => r.status.as_deref(),
            Row::Contact(r) => r.status.as_deref(),
            Row::ServiceRun(r) => r.status.as_deref(),
            Row::Event(_) | Row::Usage(_) => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Row::Job(r) => r.score,
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Row::Job(r) => r.location.as_deref(),
            _ => None,
        }
    }

    /// Display label used by the `name` sort
    pub fn label(&self) -> &str {
        match self {
            Row::Job(r) => &r.title,
            Row::Email(r) => &r.subject,
            Row::Contact(r) => &r.name,
            Row::ServiceRun(r) => r.service.as_deref().unwrap_or(""),
            Row::Event(r) => r.actor.as_deref().unwrap_or(""),
            Row::Usage(r) => r.model.as_deref().unwrap_or(""),
        }
    }

    /// Value of a text column by store column name, if the row has it set
    pub fn text_column(&self, column: &str) -> Option<&str> {
        match (self, column) {
            (Row::Job(r), "title") => Some(&r.title),
            (Row::Job(r), "company") => r.company.as_deref(),
            (Row::Job(r), "location") => r.location.as_deref(),
            (Row::Job(r), "source") => r.source.as_deref(),
            (Row::Job(r), "category") => r.category.as_deref(),
            (Row::Email(r), "subject") => Some(&r.subject),
            (Row::Email(r), "sender") => r.sender.as_deref(),
            (Row::Email(r), "recipient") => r.recipient.as_deref(),
            (Row::Email(r), "category") => r.category.as_deref(),
            (Row::Contact(r), "name") => Some(&r.name),
            (Row::Contact(r), "email") => r.email.as_deref(),
            (Row::Contact(r), "message") => r.message.as_deref(),
            (Row::ServiceRun(r), "service") => r.service.as_deref(),
            (Row::Event(r), "actor") => r.actor.as_deref(),
            (Row::Event(r), "event_type") => Some(&r.event_type),
            (Row::Usage(r), "model") => r.model.as_deref(),
            (Row::Usage(r), "service") => r.service.as_deref(),
            (_, "id") => Some(self.id()),
            (_, "status") => self.status(),
            _ => None,
        }
    }
}
