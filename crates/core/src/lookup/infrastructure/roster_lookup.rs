use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::lookup::domain::lookup_service::{
    AttendeeRecord, LookupError, LookupResult, LookupService,
};

/// Answers lookups from an in-memory roster keyed by payload.
///
/// An optional artificial latency makes the asynchronous path observable
/// when no real backend is around.
pub struct RosterLookupService {
    roster: HashMap<String, AttendeeRecord>,
    latency: Duration,
}

impl RosterLookupService {
    pub fn new(roster: HashMap<String, AttendeeRecord>) -> Self {
        Self {
            roster,
            latency: Duration::ZERO,
        }
    }

    /// The three sample attendees used for demos.
    pub fn demo() -> Self {
        Self::new(HashMap::from([
            (
                "ALU123".to_string(),
                AttendeeRecord::new("María", "García", "Present"),
            ),
            (
                "ALU456".to_string(),
                AttendeeRecord::new("Carlos", "Pérez", "Late"),
            ),
            (
                "ALU789".to_string(),
                AttendeeRecord::new("Lucía", "Rodríguez", "Present"),
            ),
        ]))
    }

    /// Loads a roster from a JSON object mapping payload to record.
    pub fn from_json_file(path: &Path) -> Result<Self, LookupError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            LookupError::NotConfigured(format!("cannot read roster {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LookupError> {
        let roster: HashMap<String, AttendeeRecord> =
            serde_json::from_str(json).map_err(|e| LookupError::Malformed(e.to_string()))?;
        Ok(Self::new(roster))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }
}

impl LookupService for RosterLookupService {
    fn lookup(&self, payload: &str) -> Result<LookupResult, LookupError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        Ok(match self.roster.get(payload) {
            Some(record) => LookupResult::found(record.clone()),
            None => LookupResult::not_found("ID not found in the local roster"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_roster_finds_known_id() {
        let service = RosterLookupService::demo();
        let result = service.lookup("ALU123").unwrap();
        assert!(result.found);
        assert_eq!(
            result.record.unwrap(),
            AttendeeRecord::new("María", "García", "Present")
        );
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let service = RosterLookupService::demo();
        let result = service.lookup("NOPE").unwrap();
        assert!(!result.found);
        assert!(result.record.is_none());
        assert!(result.message.is_some());
    }

    #[test]
    fn test_from_json_str() {
        let service = RosterLookupService::from_json_str(
            r#"{"S1": {"name": "Ana", "surname": "Ruiz", "status": "Present"}}"#,
        )
        .unwrap();
        assert_eq!(service.len(), 1);
        assert!(service.lookup("S1").unwrap().found);
    }

    #[test]
    fn test_from_malformed_json_fails() {
        let err = RosterLookupService::from_json_str("[1, 2").err().unwrap();
        assert!(matches!(err, LookupError::Malformed(_)));
    }

    #[test]
    fn test_from_missing_file_is_not_configured() {
        let err = RosterLookupService::from_json_file(Path::new("/nonexistent/roster.json"))
            .err()
            .unwrap();
        assert!(matches!(err, LookupError::NotConfigured(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(
            &path,
            r#"{"S9": {"name": "Luis", "surname": "Mora", "status": "Late"}}"#,
        )
        .unwrap();
        let service = RosterLookupService::from_json_file(&path).unwrap();
        let record = service.lookup("S9").unwrap().record.unwrap();
        assert_eq!(record.status, "Late");
    }

    #[test]
    fn test_latency_is_applied() {
        let service = RosterLookupService::demo().with_latency(Duration::from_millis(20));
        let start = std::time::Instant::now();
        service.lookup("ALU123").unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
