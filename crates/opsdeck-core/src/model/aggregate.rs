//! Derived dashboard shapes. Never persisted; recomputed from rows on every
//! accepted response.

use crate::model::event::EventPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most recent run of one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRun {
    pub service: String,
    pub last_run: DateTime<Utc>,
    pub duration_ms: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub model: String,
    pub calls: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_calls: u64,
    pub total_cost: f64,
    pub last_7d_cost: f64,
    pub by_model: Vec<ModelUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCount {
    pub actor: String,
    pub count: u64,
}

/// One decoded event in the recent activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateView {
    pub latest_by_service: BTreeMap<String, LatestRun>,
    pub usage_summary: UsageSummary,
    pub counts_by_actor: Vec<ActorCount>,
}
