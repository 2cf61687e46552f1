//! Tier 1 predicate translation into parameterized SQL.
//!
//! Identifiers come only from the table's column whitelist; every value,
//! including escaped search patterns, is bound as a parameter.

use crate::errors::Result;
use opsdeck_core::escape;
use opsdeck_core::filter::{RowRequest, Tier1Predicate};
use opsdeck_core::sort::STATUS_PRIORITY;
use opsdeck_core::sort::UNRANKED;
use opsdeck_core::{RowTable, SortKey};
use rusqlite::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub select_sql: String,
    pub count_sql: String,
    /// Parameters for the WHERE clause, shared by both statements
    pub filter_params: Vec<Value>,
    pub limit: i64,
    pub offset: i64,
}

impl SqlQuery {
    /// Filter parameters followed by LIMIT and OFFSET
    pub fn select_params(&self) -> Vec<Value> {
        let mut params = self.filter_params.clone();
        params.push(Value::Integer(self.limit));
        params.push(Value::Integer(self.offset));
        params
    }
}

fn quote(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}

fn render_predicate(
    table: RowTable,
    predicate: &Tier1Predicate,
    params: &mut Vec<Value>,
) -> String {
    match predicate {
        Tier1Predicate::Eq { column, value } => {
            params.push(Value::Text(value.clone()));
            format!("{} = ?", quote(column))
        }
        Tier1Predicate::MinScore(min) => {
            params.push(Value::Real(*min));
            "\"score\" >= ?".to_string()
        }
        Tier1Predicate::SearchAny { columns, text } => {
            let pattern = escape::contains_pattern(text);
            let clauses: Vec<String> = columns
                .iter()
                .map(|c| {
                    params.push(Value::Text(pattern.clone()));
                    format!("{} LIKE ? ESCAPE '\\'", quote(c))
                })
                .collect();
            format!("({})", clauses.join(" OR "))
        }
        Tier1Predicate::OccurredAfter(bound) => {
            params.push(Value::Integer(bound.timestamp_millis()));
            format!("{} >= ?", quote(table.time_column()))
        }
    }
}

fn priority_case() -> String {
    let arms: Vec<String> = STATUS_PRIORITY
        .iter()
        .map(|(status, rank)| format!("WHEN '{}' THEN {}", status, rank))
        .collect();
    format!("CASE \"status\" {} ELSE {} END", arms.join(" "), UNRANKED)
}

fn order_by(table: RowTable, hint: Option<SortKey>) -> String {
    let time = quote(table.time_column());
    let primary = match hint {
        Some(SortKey::Priority) if table.has_column("status") => {
            format!("{} ASC, {} DESC", priority_case(), time)
        }
        Some(SortKey::Score) if table.has_column("score") => {
            "COALESCE(\"score\", 0) DESC".to_string()
        }
        Some(SortKey::Name) => format!("{} ASC", quote(table.label_column())),
        _ => format!("{} DESC", time),
    };
    format!("{}, rowid ASC", primary)
}

/// Build the page and count statements for `request`
pub fn build_query(request: &RowRequest) -> Result<SqlQuery> {
    request.validate()?;
    let table = request.table;

    let mut filter_params = Vec::new();
    let clauses: Vec<String> = request
        .predicates
        .iter()
        .map(|p| render_predicate(table, p, &mut filter_params))
        .collect();
    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let columns: Vec<String> = table.columns().iter().map(|c| quote(c)).collect();
    let select_sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
        columns.join(", "),
        table.as_str(),
        where_sql,
        order_by(table, request.sort_hint),
    );
    let count_sql = format!("SELECT COUNT(*) FROM {}{}", table.as_str(), where_sql);

    Ok(SqlQuery {
        select_sql,
        count_sql,
        filter_params,
        limit: i64::from(request.limit),
        offset: i64::try_from(request.offset).unwrap_or(i64::MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_renders_escaped_like_per_column() {
        let request = RowRequest::new(RowTable::Contacts).with_predicate(Tier1Predicate::SearchAny {
            columns: vec!["name".into(), "message".into()],
            text: "50%_off".into(),
        });
        let query = build_query(&request).unwrap();
        assert!(query
            .select_sql
            .contains("(\"name\" LIKE ? ESCAPE '\\' OR \"message\" LIKE ? ESCAPE '\\')"));
        assert_eq!(
            query.filter_params,
            vec![
                Value::Text("%50\\%\\_off%".into()),
                Value::Text("%50\\%\\_off%".into())
            ]
        );
    }

    #[test]
    fn test_no_predicates_has_no_where() {
        let query = build_query(&RowRequest::new(RowTable::Jobs)).unwrap();
        assert_eq!(query.count_sql, "SELECT COUNT(*) FROM jobs");
        assert!(query
            .select_sql
            .ends_with("ORDER BY \"created_at\" DESC, rowid ASC LIMIT ? OFFSET ?"));
    }

    #[test]
    fn test_priority_hint_uses_rank_case() {
        let query =
            build_query(&RowRequest::new(RowTable::Jobs).with_sort_hint(SortKey::Priority))
                .unwrap();
        assert!(query.select_sql.contains("WHEN 'offer' THEN 0"));
        assert!(query.select_sql.contains("ELSE 99 END ASC"));
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let request = RowRequest::new(RowTable::UsageRecords).with_predicate(Tier1Predicate::Eq {
            column: "status; DROP TABLE jobs".into(),
            value: "x".into(),
        });
        assert!(build_query(&request).is_err());
    }
}
