//! Client-held filter state for one dashboard view.
//!
//! A `FilterState` is immutable per query: every user edit produces a new
//! value. All enumerations are closed; parsing rejects anything outside them
//! before a request can be dispatched.

use crate::errors::DashError;
use crate::model::row::{FilterField, RowTable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(invalid("time_window", other)),
        }
    }
}

/// Derived score band: high is 8 and above, medium is 6 up to 8, low is below 6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for ScoreBand {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(invalid("score_band", other)),
        }
    }
}

/// Normalized location bucket. Raw location strings are free text written by
/// the agents; matching them to a bucket goes through an alias table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationBucket {
    #[default]
    All,
    Remote,
    NorthAmerica,
    UnitedKingdom,
    Europe,
    Asia,
}

impl LocationBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Remote => "remote",
            Self::NorthAmerica => "north_america",
            Self::UnitedKingdom => "united_kingdom",
            Self::Europe => "europe",
            Self::Asia => "asia",
        }
    }
}

impl FromStr for LocationBucket {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "remote" => Ok(Self::Remote),
            "north_america" => Ok(Self::NorthAmerica),
            "united_kingdom" => Ok(Self::UnitedKingdom),
            "europe" => Ok(Self::Europe),
            "asia" => Ok(Self::Asia),
            other => Err(invalid("location_bucket", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Priority,
    #[default]
    Date,
    Score,
    Name,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Date => "date",
            Self::Score => "score",
            Self::Name => "name",
        }
    }
}

impl FromStr for SortKey {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priority" => Ok(Self::Priority),
            "date" => Ok(Self::Date),
            "score" => Ok(Self::Score),
            "name" => Ok(Self::Name),
            other => Err(invalid("sort_key", other)),
        }
    }
}

fn invalid(field: &str, value: &str) -> DashError {
    DashError::InvalidFilterValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Validated filter state for one view query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub status: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub min_score: Option<f64>,
    pub time_window: TimeWindow,
    pub score_band: ScoreBand,
    pub location_bucket: LocationBucket,
    pub search_text: String,
    pub sort_key: SortKey,
}

impl FilterState {
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = window;
        self
    }

    pub fn with_score_band(mut self, band: ScoreBand) -> Self {
        self.score_band = band;
        self
    }

    pub fn with_location(mut self, bucket: LocationBucket) -> Self {
        self.location_bucket = bucket;
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort_key = key;
        self
    }

    /// Trimmed search text, `None` when there is nothing to search for
    pub fn search_term(&self) -> Option<&str> {
        let trimmed = self.search_text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// True if any client-evaluated predicate is active
    pub fn has_client_predicates(&self) -> bool {
        self.time_window != TimeWindow::All
            || self.score_band != ScoreBand::All
            || self.location_bucket != LocationBucket::All
    }

    /// Reject filters the table cannot evaluate, and non-finite scores.
    ///
    /// # Errors
    ///
    /// `UnsupportedFilter` when a field is set that `table` does not carry;
    /// `InvalidMinScore` when `min_score` is NaN or infinite.
    pub fn validate_for(&self, table: RowTable) -> Result<(), DashError> {
        if let Some(score) = self.min_score {
            if !score.is_finite() {
                return Err(DashError::InvalidMinScore {
                    value: score.to_string(),
                });
            }
        }

        let requested = [
            (FilterField::Status, self.status.is_some()),
            (FilterField::Source, self.source.is_some()),
            (FilterField::Category, self.category.is_some()),
            (FilterField::MinScore, self.min_score.is_some()),
            (FilterField::ScoreBand, self.score_band != ScoreBand::All),
            (
                FilterField::Location,
                self.location_bucket != LocationBucket::All,
            ),
        ];
        for (field, set) in requested {
            if set && !table.supports(field) {
                return Err(DashError::UnsupportedFilter {
                    table: table.as_str().to_string(),
                    field: field.as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Untyped filter parameters as they arrive from a CLI or query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_score: Option<String>,
    #[serde(default)]
    pub time_window: Option<String>,
    #[serde(default)]
    pub score_band: Option<String>,
    #[serde(default)]
    pub location_bucket: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl TryFrom<RawFilter> for FilterState {
    type Error = DashError;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        let min_score = raw
            .min_score
            .as_deref()
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite())
                    .ok_or_else(|| DashError::InvalidMinScore {
                        value: v.to_string(),
                    })
            })
            .transpose()?;

        Ok(FilterState {
            status: non_empty(raw.status),
            source: non_empty(raw.source),
            category: non_empty(raw.category),
            min_score,
            time_window: parse_or_default(raw.time_window.as_deref())?,
            score_band: parse_or_default(raw.score_band.as_deref())?,
            location_bucket: parse_or_default(raw.location_bucket.as_deref())?,
            search_text: raw.search.unwrap_or_default(),
            sort_key: parse_or_default(raw.sort.as_deref())?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or_default<T>(value: Option<&str>) -> Result<T, DashError>
where
    T: FromStr<Err = DashError> + Default,
{
    match value {
        None => Ok(T::default()),
        Some(v) => v.trim().parse(),
    }
}
