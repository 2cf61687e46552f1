//! Seed bundle schema
//!
//! Every table section is optional. Timestamps are RFC 3339 strings.

use opsdeck_core::model::{ContactRow, EmailRow, EventRow, JobRow, Row, ServiceRunRow, UsageRow};
use serde::{Deserialize, Serialize};

pub const SEED_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedBundle {
    pub schema_version: u32,
    #[serde(default)]
    pub jobs: Vec<JobRow>,
    #[serde(default)]
    pub emails: Vec<EmailRow>,
    #[serde(default)]
    pub contacts: Vec<ContactRow>,
    #[serde(default)]
    pub service_runs: Vec<ServiceRunRow>,
    #[serde(default)]
    pub events: Vec<EventRow>,
    #[serde(default)]
    pub usage_records: Vec<UsageRow>,
}

impl SeedBundle {
    pub fn row_count(&self) -> usize {
        self.jobs.len()
            + self.emails.len()
            + self.contacts.len()
            + self.service_runs.len()
            + self.events.len()
            + self.usage_records.len()
    }

    /// All rows, table by table in schema order
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.jobs
            .iter()
            .cloned()
            .map(Row::Job)
            .chain(self.emails.iter().cloned().map(Row::Email))
            .chain(self.contacts.iter().cloned().map(Row::Contact))
            .chain(self.service_runs.iter().cloned().map(Row::ServiceRun))
            .chain(self.events.iter().cloned().map(Row::Event))
            .chain(self.usage_records.iter().cloned().map(Row::Usage))
    }
}
