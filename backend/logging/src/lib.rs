//! Structured logging for Greenlens.
//!
//! Console and rolling NDJSON output, secret redaction, and pipeline event records.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, PipelineEvent};
pub use logger::{LOG_FILE_PREFIX, init_logger};
pub use redact::redact_sensitive_data;
