//! Tier 1: predicates the row source evaluates before rows leave the store

use crate::errors::DashError;
use crate::escape;
use crate::model::{Row, RowTable, SortKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A predicate pushed down to the row source
#[derive(Debug, Clone, PartialEq)]
pub enum Tier1Predicate {
    /// Exact, case-sensitive column equality
    Eq { column: String, value: String },
    /// `score >= n`; rows without a score never match
    MinScore(f64),
    /// Case-insensitive substring match OR-ed across `columns`.
    /// `text` is raw user input; escaping happens when the LIKE pattern is built.
    SearchAny { columns: Vec<String>, text: String },
    /// Occurrence timestamp at or after the bound
    OccurredAfter(DateTime<Utc>),
}

impl Tier1Predicate {
    /// Reference evaluation against an in-memory row
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::Eq { column, value } => row.text_column(column) == Some(value.as_str()),
            Self::MinScore(min) => row.score().is_some_and(|s| s >= *min),
            Self::SearchAny { columns, text } => {
                let pattern = escape::contains_pattern(text);
                columns.iter().any(|c| {
                    row.text_column(c)
                        .is_some_and(|v| escape::like_match(&pattern, v))
                })
            }
            Self::OccurredAfter(bound) => row.occurred_at() >= *bound,
        }
    }

    /// Columns this predicate reads
    pub fn columns(&self, table: RowTable) -> Vec<&str> {
        match self {
            Self::Eq { column, .. } => vec![column.as_str()],
            Self::MinScore(_) => vec!["score"],
            Self::SearchAny { columns, .. } => columns.iter().map(String::as_str).collect(),
            Self::OccurredAfter(_) => vec![table.time_column()],
        }
    }
}

/// One request for a page of rows from a single table
#[derive(Debug, Clone, PartialEq)]
pub struct RowRequest {
    pub table: RowTable,
    pub predicates: Vec<Tier1Predicate>,
    /// Store-side ordering hint; the sort engine always re-sorts.
    pub sort_hint: Option<SortKey>,
    pub limit: u32,
    pub offset: u64,
}

impl RowRequest {
    pub fn new(table: RowTable) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            sort_hint: None,
            limit: 50,
            offset: 0,
        }
    }

    pub fn with_predicates(mut self, predicates: Vec<Tier1Predicate>) -> Self {
        self.predicates = predicates;
        self
    }

    pub fn with_predicate(mut self, predicate: Tier1Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_sort_hint(mut self, key: SortKey) -> Self {
        self.sort_hint = Some(key);
        self
    }

    pub fn with_page(mut self, limit: u32, offset: u64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Check every referenced column against the table's whitelist.
    ///
    /// # Errors
    ///
    /// `ZeroLimit` for an empty page; `UnknownColumn` for any column the
    /// table does not have.
    pub fn validate(&self) -> Result<(), DashError> {
        if self.limit == 0 {
            return Err(DashError::ZeroLimit);
        }
        for predicate in &self.predicates {
            for column in predicate.columns(self.table) {
                if !self.table.has_column(column) {
                    return Err(DashError::UnknownColumn {
                        table: self.table.as_str().to_string(),
                        column: column.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A page of rows plus the exact match count when the source knows it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowPage {
    pub rows: Vec<Row>,
    pub count: Option<u64>,
}
