//! Pipeline Event Logger
//!
//! Structured events (annotated, searched, failed) emitted as NDJSON under
//! the `pipeline_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Annotated {
        objects: String,
        detections: usize,
    },
    Searched {
        query: String,
        k: usize,
        hits: usize,
    },
    Failed {
        stage: String,
        error_msg: String,
    },
}

impl PipelineEvent {
    fn redacted(self) -> Self {
        match self {
            PipelineEvent::Searched { query, k, hits } => PipelineEvent::Searched {
                query: redact_sensitive_data(&query),
                k,
                hits,
            },
            PipelineEvent::Failed { stage, error_msg } => PipelineEvent::Failed {
                stage,
                error_msg: redact_sensitive_data(&error_msg),
            },
            annotated => annotated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

impl EventLogEntry {
    pub fn new(request_id: &str, event: PipelineEvent) -> Self {
        Self {
            request_id: request_id.to_string(),
            timestamp: Utc::now(),
            event: event.redacted(),
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts and logs one pipeline event.
    pub fn log_event(request_id: &str, event: PipelineEvent) {
        let entry = EventLogEntry::new(request_id, event);
        match serde_json::to_string(&entry) {
            Ok(line) => info!(target: "pipeline_events", event = %line, "Pipeline event"),
            Err(_) => info!(target: "pipeline_events", event = ?entry, "Pipeline event"),
        }
    }
}
