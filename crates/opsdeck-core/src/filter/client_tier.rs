//! Tier 2: predicates evaluated in memory after rows are fetched

use crate::aggregate::DEFAULT_SCORE;
use crate::model::{LocationBucket, Row, ScoreBand, TimeWindow};
use chrono::{DateTime, Duration, Utc};

pub const HIGH_SCORE_MIN: f64 = 8.0;
pub const MEDIUM_SCORE_MIN: f64 = 6.0;

const REMOTE_ALIASES: &[&str] = &[
    "remote",
    "anywhere",
    "wfh",
    "work from home",
    "home based",
    "distributed",
    "fully remote",
];

const NORTH_AMERICA_ALIASES: &[&str] = &[
    "north america",
    "united states",
    "usa",
    "us",
    "u s",
    "america",
    "canada",
    "mexico",
    "new york",
    "nyc",
    "san francisco",
    "sf",
    "bay area",
    "seattle",
    "austin",
    "boston",
    "chicago",
    "los angeles",
    "denver",
    "toronto",
    "vancouver",
    "montreal",
];

const UNITED_KINGDOM_ALIASES: &[&str] = &[
    "united kingdom",
    "uk",
    "u k",
    "great britain",
    "gb",
    "england",
    "scotland",
    "wales",
    "london",
    "manchester",
    "edinburgh",
    "bristol",
    "cambridge",
];

const EUROPE_ALIASES: &[&str] = &[
    "europe",
    "eu",
    "emea",
    "germany",
    "berlin",
    "munich",
    "france",
    "paris",
    "netherlands",
    "amsterdam",
    "spain",
    "madrid",
    "barcelona",
    "ireland",
    "dublin",
    "portugal",
    "lisbon",
    "poland",
    "warsaw",
    "sweden",
    "stockholm",
    "switzerland",
    "zurich",
];

const ASIA_ALIASES: &[&str] = &[
    "asia",
    "apac",
    "india",
    "bangalore",
    "bengaluru",
    "singapore",
    "japan",
    "tokyo",
    "china",
    "shanghai",
    "hong kong",
    "korea",
    "seoul",
    "taiwan",
    "vietnam",
];

fn aliases(bucket: LocationBucket) -> &'static [&'static str] {
    match bucket {
        LocationBucket::All => &[],
        LocationBucket::Remote => REMOTE_ALIASES,
        LocationBucket::NorthAmerica => NORTH_AMERICA_ALIASES,
        LocationBucket::UnitedKingdom => UNITED_KINGDOM_ALIASES,
        LocationBucket::Europe => EUROPE_ALIASES,
        LocationBucket::Asia => ASIA_ALIASES,
    }
}

/// Lowercase and reduce to space-separated alphanumeric words, padded with
/// a space on each side so aliases match on word boundaries.
fn normalize_location(location: &str) -> String {
    let mut out = String::from(" ");
    for word in location
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        out.push_str(&word.to_lowercase());
        out.push(' ');
    }
    out
}

/// True if free-text `location` falls into `bucket`.
///
/// A location may match more than one bucket ("Remote (US)").
pub fn location_matches(bucket: LocationBucket, location: &str) -> bool {
    if bucket == LocationBucket::All {
        return true;
    }
    let normalized = normalize_location(location);
    aliases(bucket)
        .iter()
        .any(|alias| normalized.contains(&format!(" {alias} ")))
}

/// Score band membership, with a missing score treated as `DEFAULT_SCORE`
pub fn in_score_band(band: ScoreBand, score: Option<f64>) -> bool {
    let score = score.unwrap_or(DEFAULT_SCORE);
    match band {
        ScoreBand::All => true,
        ScoreBand::High => score >= HIGH_SCORE_MIN,
        ScoreBand::Medium => (MEDIUM_SCORE_MIN..HIGH_SCORE_MIN).contains(&score),
        ScoreBand::Low => score < MEDIUM_SCORE_MIN,
    }
}

/// Lower bound of a time window, `None` for `All`.
///
/// `Today` starts at midnight UTC of `now`'s day; `Week` and `Month` are
/// rolling 7 and 30 day windows.
pub fn window_start(window: TimeWindow, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match window {
        TimeWindow::All => None,
        TimeWindow::Today => now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc()),
        TimeWindow::Week => Some(now - Duration::days(7)),
        TimeWindow::Month => Some(now - Duration::days(30)),
    }
}

/// A predicate applied to already-fetched rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tier2Predicate {
    ScoreBand(ScoreBand),
    Location(LocationBucket),
    TimeWindow {
        window: TimeWindow,
        now: DateTime<Utc>,
    },
}

impl Tier2Predicate {
    pub fn matches(&self, row: &Row) -> bool {
        match *self {
            Self::ScoreBand(band) => in_score_band(band, row.score()),
            Self::Location(bucket) => {
                bucket == LocationBucket::All
                    || row
                        .location()
                        .is_some_and(|loc| location_matches(bucket, loc))
            }
            Self::TimeWindow { window, now } => match window_start(window, now) {
                Some(start) => row.occurred_at() >= start,
                None => true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_location_aliases_match_on_word_boundaries() {
        assert!(location_matches(LocationBucket::Remote, "Remote - Worldwide"));
        assert!(location_matches(LocationBucket::Remote, "WFH"));
        assert!(location_matches(LocationBucket::NorthAmerica, "Austin, TX, US"));
        assert!(location_matches(LocationBucket::NorthAmerica, "U.S."));
        assert!(!location_matches(LocationBucket::NorthAmerica, "Russia"));
        assert!(location_matches(LocationBucket::UnitedKingdom, "London, UK"));
        assert!(!location_matches(LocationBucket::UnitedKingdom, "Bangkok"));
        assert!(location_matches(LocationBucket::Europe, "Berlin, Germany"));
        assert!(location_matches(LocationBucket::Asia, "Bengaluru"));
    }

    #[test]
    fn test_location_can_fall_in_several_buckets() {
        let loc = "Remote (US)";
        assert!(location_matches(LocationBucket::Remote, loc));
        assert!(location_matches(LocationBucket::NorthAmerica, loc));
        assert!(!location_matches(LocationBucket::Asia, loc));
    }

    #[test]
    fn test_score_bands() {
        assert!(in_score_band(ScoreBand::High, Some(8.0)));
        assert!(in_score_band(ScoreBand::Medium, Some(6.0)));
        assert!(in_score_band(ScoreBand::Medium, Some(7.9)));
        assert!(in_score_band(ScoreBand::Low, Some(5.9)));
        assert!(in_score_band(ScoreBand::Low, None));
        assert!(!in_score_band(ScoreBand::High, None));
    }

    #[test]
    fn test_window_start() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 30, 0).unwrap();
        assert_eq!(
            window_start(TimeWindow::Today, now),
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(
            window_start(TimeWindow::Week, now),
            Some(Utc.with_ymd_and_hms(2026, 3, 3, 15, 30, 0).unwrap())
        );
        assert_eq!(window_start(TimeWindow::All, now), None);
    }
}
