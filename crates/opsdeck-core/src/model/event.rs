//! Typed decoding of agent event payloads.
//!
//! Events arrive as an `event_type` string plus a free-form JSON payload.
//! Known types decode into a dedicated variant; anything else, including a
//! known type whose payload does not match its shape, decodes to `Unknown`
//! with the raw payload preserved. Decoding never fails.

use crate::model::row::EventRow;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum EventPayload {
    JobDiscovered {
        job_id: String,
        title: String,
    },
    EmailSent {
        to: String,
        subject: String,
    },
    EmailReceived {
        from: String,
        subject: String,
    },
    ContactReceived {
        name: String,
        #[serde(default)]
        email: Option<String>,
    },
    ServiceRun {
        service: String,
        status: String,
        #[serde(default)]
        duration_ms: Option<i64>,
    },
    UsageRecorded {
        model: String,
        #[serde(default)]
        cost: Option<f64>,
    },
    #[serde(skip_deserializing)]
    Unknown { event_type: String, raw: Value },
}

impl EventPayload {
    /// Decode by discriminant, falling back to `Unknown`
    pub fn decode(event_type: &str, payload: &Value) -> Self {
        let tagged = json!({ "event_type": event_type, "payload": payload });
        match serde_json::from_value::<EventPayload>(tagged) {
            Ok(decoded) if !decoded.is_unknown() => decoded,
            _ => Self::Unknown {
                event_type: event_type.to_string(),
                raw: payload.clone(),
            },
        }
    }

    pub fn from_row(row: &EventRow) -> Self {
        Self::decode(&row.event_type, &row.payload)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}
