use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),
    #[error("lookup service answered with status {status} for {payload}")]
    Status { payload: String, status: u16 },
    #[error("malformed lookup response: {0}")]
    Malformed(String),
    #[error("lookup service is not configured: {0}")]
    NotConfigured(String),
}

/// An attendee as stored in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub status: String,
}

impl AttendeeRecord {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            status: status.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub found: bool,
    pub record: Option<AttendeeRecord>,
    pub message: Option<String>,
}

impl LookupResult {
    pub fn found(record: AttendeeRecord) -> Self {
        Self {
            found: true,
            record: Some(record),
            message: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            found: false,
            record: None,
            message: Some(message.into()),
        }
    }
}

/// Resolves a decoded payload to an attendee.
///
/// Called from worker threads, so implementations must be shareable. Latency
/// is unbounded; callers never block the scan loop on it.
pub trait LookupService: Send + Sync {
    fn lookup(&self, payload: &str) -> Result<LookupResult, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_joins_name_and_surname() {
        let record = AttendeeRecord::new("María", "García", "Present");
        assert_eq!(record.display_name(), "María García");
    }

    #[test]
    fn test_display_name_without_surname_has_no_trailing_space() {
        let record = AttendeeRecord::new("Guest", "", "Present");
        assert_eq!(record.display_name(), "Guest");
    }

    #[test]
    fn test_record_surname_defaults_when_missing() {
        let record: AttendeeRecord =
            serde_json::from_str(r#"{"name": "Ana", "status": "Late"}"#).unwrap();
        assert_eq!(record.surname, "");
    }

    #[test]
    fn test_not_found_carries_message() {
        let result = LookupResult::not_found("no such id");
        assert!(!result.found);
        assert!(result.record.is_none());
        assert_eq!(result.message.as_deref(), Some("no such id"));
    }
}
