//! Structured logging for dropcheck.
//!
//! Console and rolling NDJSON output, secret redaction, and verification
//! event records.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, VerificationEvent, VerificationEventLogger};
pub use logger::{init_logger, LoggerOptions};
pub use redact::redact_sensitive_data;
