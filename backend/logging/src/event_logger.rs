//! Verification Event Logger
//!
//! One structured record per attempt transition, under the
//! `verification_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerificationEvent {
    Started {
        images: usize,
        model: String,
    },
    Succeeded {
        passed: bool,
        failing: Vec<String>,
    },
    Failed {
        error_msg: String,
    },
    /// Completion arrived after the selection changed and was dropped.
    Stale {
        attempt: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub attempt: u64,
    pub timestamp: DateTime<Utc>,
    pub event: VerificationEvent,
}

pub struct VerificationEventLogger;

impl VerificationEventLogger {
    /// Build the redacted log entry for an event.
    pub fn entry(attempt: u64, mut event: VerificationEvent) -> EventLogEntry {
        if let VerificationEvent::Failed { error_msg } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        EventLogEntry {
            attempt,
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(attempt: u64, event: VerificationEvent) {
        let entry = Self::entry(attempt, event);
        let payload = serde_json::to_string(&entry.event).unwrap_or_default();
        info!(
            target: "verification_events",
            attempt = entry.attempt,
            timestamp = %entry.timestamp,
            event = %payload,
            "Verification event"
        );
    }
}
