//! API Event Logger
//!
//! One structured event per handled request (analysis, stored device,
//! recycler lookup, failure), written through `tracing` under the
//! `api_events` target so it lands in the NDJSON file as well.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ApiEvent {
    Analysis {
        labels: Vec<String>,
    },
    DeviceStored {
        device_id: String,
        device_name: String,
    },
    Recyclers {
        count: usize,
    },
    Failure {
        status: u16,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub route: String,
    pub timestamp: DateTime<Utc>,
    pub event: ApiEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Builds the log entry, redacting free-text fields.
    pub fn entry(route: &str, mut event: ApiEvent) -> EventLogEntry {
        if let ApiEvent::Failure { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        EventLogEntry {
            route: route.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(route: &str, event: ApiEvent) {
        let entry = Self::entry(route, event);
        let payload = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "api_events", route = %entry.route, event = %payload, "API event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_redacted() {
        let entry = EventLogger::entry(
            "/api/analyze",
            ApiEvent::Failure {
                status: 500,
                error_msg: "request to https://x/v1?key=abc123 failed".into(),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["route"], "/api/analyze");
        assert_eq!(json["event"]["type"], "Failure");
        assert!(!json["event"]["error_msg"].as_str().unwrap().contains("abc123"));
    }

    #[test]
    fn events_are_tagged() {
        let entry = EventLogger::entry("/nearby_recyclers", ApiEvent::Recyclers { count: 3 });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "Recyclers");
        assert_eq!(json["event"]["count"], 3);
    }
}
