use chrono::{DateTime, Duration, TimeZone, Utc};
use opsdeck_core::model::{JobRow, Row};

/// Fixed reference instant for deterministic window arithmetic
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap()
}

/// Build a job row `hours_ago` hours before [`fixed_now`]
#[allow(dead_code)]
pub fn job(
    id: &str,
    status: Option<&str>,
    score: Option<f64>,
    location: Option<&str>,
    hours_ago: i64,
) -> Row {
    Row::Job(JobRow {
        id: id.to_string(),
        title: format!("Engineer {id}"),
        company: Some("Initech".to_string()),
        location: location.map(str::to_string),
        status: status.map(str::to_string),
        source: Some("board".to_string()),
        category: Some("backend".to_string()),
        score,
        created_at: fixed_now() - Duration::hours(hours_ago),
    })
}

#[allow(dead_code)]
pub fn ids(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|r| r.id().to_string()).collect()
}
