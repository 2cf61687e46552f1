//! Filtered table view
//!
//! Usage: opsdeck view <TABLE> [filters] [--page N]

use super::{parse_as_of, print_json, Context};
use clap::Args;
use opsdeck_core::model::{FilterState, RawFilter, RowTable};

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// jobs, emails, contacts, service_runs, events or usage_records
    pub table: String,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub min_score: Option<String>,

    /// all, today, week or month
    #[arg(long)]
    pub time_window: Option<String>,

    /// all, high, medium or low
    #[arg(long)]
    pub score_band: Option<String>,

    /// all, remote, north_america, united_kingdom, europe or asia
    #[arg(long)]
    pub location: Option<String>,

    /// Free text matched against the table's text columns
    #[arg(long)]
    pub search: Option<String>,

    /// priority, date, score or name
    #[arg(long)]
    pub sort: Option<String>,

    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    pub page: u64,

    /// Evaluate time windows as of this RFC 3339 timestamp
    #[arg(long)]
    pub as_of: Option<String>,
}

impl ViewArgs {
    fn raw_filter(&self) -> RawFilter {
        RawFilter {
            status: self.status.clone(),
            source: self.source.clone(),
            category: self.category.clone(),
            min_score: self.min_score.clone(),
            time_window: self.time_window.clone(),
            score_band: self.score_band.clone(),
            location_bucket: self.location.clone(),
            search: self.search.clone(),
            sort: self.sort.clone(),
        }
    }
}

pub async fn execute(ctx: &Context, args: ViewArgs) -> anyhow::Result<()> {
    let table: RowTable = args.table.parse()?;
    let filter = FilterState::try_from(args.raw_filter())?;
    let now = parse_as_of(args.as_of.as_deref())?;
    let source = ctx.row_source()?;

    let result = opsdeck_engine::fetch_view(
        &source,
        table,
        &filter,
        args.page,
        &ctx.config.query,
        now,
    )
    .await?;
    print_json(&result)
}
