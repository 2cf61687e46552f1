//! Two-tier filter pipeline.
//!
//! Tier 1 predicates are pushed down to the row source: exact matches on
//! status/source/category, a minimum score, and an escaped free-text
//! substring match OR-ed across the table's text columns.
//!
//! Tier 2 predicates run in memory over the Tier 1 result: score band,
//! location bucket (alias matching) and time window relative to an injected
//! "now". Tier 2 only ever narrows what Tier 1 returned.

pub mod client_tier;
pub mod server_tier;

pub use client_tier::{location_matches, Tier2Predicate};
pub use server_tier::{RowPage, RowRequest, Tier1Predicate};

use crate::errors::DashError;
use crate::model::{FilterState, Row, RowTable};
use chrono::{DateTime, Utc};

pub struct FilterPipeline;

impl FilterPipeline {
    /// Build the pushed-down predicates for `table`.
    ///
    /// # Errors
    ///
    /// Fails if `filter` sets a field `table` does not carry.
    pub fn server_tier(
        filter: &FilterState,
        table: RowTable,
    ) -> Result<Vec<Tier1Predicate>, DashError> {
        filter.validate_for(table)?;

        let mut predicates = Vec::new();
        let exact = [
            ("status", &filter.status),
            ("source", &filter.source),
            ("category", &filter.category),
        ];
        for (column, value) in exact {
            if let Some(value) = value {
                predicates.push(Tier1Predicate::Eq {
                    column: column.to_string(),
                    value: value.clone(),
                });
            }
        }
        if let Some(min) = filter.min_score {
            predicates.push(Tier1Predicate::MinScore(min));
        }
        if let Some(term) = filter.search_term() {
            predicates.push(Tier1Predicate::SearchAny {
                columns: table
                    .search_columns()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                text: term.to_string(),
            });
        }
        Ok(predicates)
    }

    /// Build the in-memory predicates. `All` selections contribute nothing.
    pub fn client_tier(filter: &FilterState, now: DateTime<Utc>) -> Vec<Tier2Predicate> {
        let mut predicates = Vec::new();
        if filter.score_band != crate::model::ScoreBand::All {
            predicates.push(Tier2Predicate::ScoreBand(filter.score_band));
        }
        if filter.location_bucket != crate::model::LocationBucket::All {
            predicates.push(Tier2Predicate::Location(filter.location_bucket));
        }
        if filter.time_window != crate::model::TimeWindow::All {
            predicates.push(Tier2Predicate::TimeWindow {
                window: filter.time_window,
                now,
            });
        }
        predicates
    }

    /// Keep rows that satisfy every predicate, preserving input order
    pub fn apply_client_tier(rows: Vec<Row>, predicates: &[Tier2Predicate]) -> Vec<Row> {
        if predicates.is_empty() {
            return rows;
        }
        rows.into_iter()
            .filter(|row| predicates.iter().all(|p| p.matches(row)))
            .collect()
    }

    /// In-memory evaluation of Tier 1, used by the in-memory row source and
    /// as the reference semantics for the store translation.
    pub fn apply_server_tier(rows: Vec<Row>, predicates: &[Tier1Predicate]) -> Vec<Row> {
        rows.into_iter()
            .filter(|row| predicates.iter().all(|p| p.matches(row)))
            .collect()
    }

    /// Both tiers, in their fixed order
    pub fn apply(
        rows: Vec<Row>,
        filter: &FilterState,
        table: RowTable,
        now: DateTime<Utc>,
    ) -> Result<Vec<Row>, DashError> {
        let tier1 = Self::server_tier(filter, table)?;
        let tier2 = Self::client_tier(filter, now);
        Ok(Self::apply_client_tier(
            Self::apply_server_tier(rows, &tier1),
            &tier2,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobRow, LocationBucket, ScoreBand, TimeWindow};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn job(id: &str, score: Option<f64>, location: Option<&str>, age_days: i64) -> Row {
        Row::Job(JobRow {
            id: id.into(),
            title: format!("Job {id}"),
            company: Some("Acme".into()),
            location: location.map(str::to_string),
            status: Some("new".into()),
            source: Some("board".into()),
            category: None,
            score,
            created_at: now() - Duration::days(age_days),
        })
    }

    #[test]
    fn test_server_tier_builds_pushdown_predicates() {
        let filter = FilterState::default()
            .with_status("new")
            .with_min_score(6.0)
            .with_search(" rust ");
        let predicates = FilterPipeline::server_tier(&filter, RowTable::Jobs).unwrap();
        assert_eq!(
            predicates,
            vec![
                Tier1Predicate::Eq {
                    column: "status".into(),
                    value: "new".into()
                },
                Tier1Predicate::MinScore(6.0),
                Tier1Predicate::SearchAny {
                    columns: vec!["title".into(), "company".into(), "location".into()],
                    text: "rust".into()
                },
            ]
        );
    }

    #[test]
    fn test_server_tier_ignores_client_fields() {
        let filter = FilterState::default()
            .with_score_band(ScoreBand::High)
            .with_time_window(TimeWindow::Week);
        assert!(FilterPipeline::server_tier(&filter, RowTable::Jobs)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_client_tier_skips_all_selections() {
        assert!(FilterPipeline::client_tier(&FilterState::default(), now()).is_empty());
        let filter = FilterState::default().with_location(LocationBucket::Remote);
        assert_eq!(FilterPipeline::client_tier(&filter, now()).len(), 1);
    }

    #[test]
    fn test_apply_narrows_in_order() {
        let rows = vec![
            job("a", Some(9.0), Some("Remote"), 1),
            job("b", Some(9.0), Some("Berlin"), 1),
            job("c", Some(5.0), Some("Remote"), 1),
            job("d", Some(9.5), Some("Remote - US"), 40),
        ];
        let filter = FilterState::default()
            .with_score_band(ScoreBand::High)
            .with_location(LocationBucket::Remote)
            .with_time_window(TimeWindow::Month);
        let kept = FilterPipeline::apply(rows, &filter, RowTable::Jobs, now()).unwrap();
        let ids: Vec<_> = kept.iter().map(Row::id).collect();
        assert_eq!(ids, vec!["a"]);
    }
}
