use chrono::{DateTime, Local};
use serde::Serialize;

use crate::lookup::domain::lookup_service::{LookupError, LookupResult};
use crate::shared::constants::{LOOKUP_ERROR_STATUS, NOT_REGISTERED_STATUS, UNKNOWN_DISPLAY_NAME};
use crate::shared::quad::BoundingQuad;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOutcome {
    Matched,
    NotFound,
    Failed,
}

/// What the "current result" card shows after a lookup completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub outcome: LookupOutcome,
    pub display_name: String,
    pub status: String,
    pub note: Option<String>,
}

impl ResultView {
    pub fn from_lookup(result: &Result<LookupResult, LookupError>) -> Self {
        match result {
            Ok(LookupResult {
                found: true,
                record: Some(record),
                message,
            }) => Self {
                outcome: LookupOutcome::Matched,
                display_name: record.display_name(),
                status: record.status.clone(),
                note: message.clone(),
            },
            Ok(result) => Self {
                outcome: LookupOutcome::NotFound,
                display_name: result
                    .record
                    .as_ref()
                    .map(|r| r.display_name())
                    .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string()),
                status: NOT_REGISTERED_STATUS.to_string(),
                note: result.message.clone(),
            },
            Err(e) => Self {
                outcome: LookupOutcome::Failed,
                display_name: UNKNOWN_DISPLAY_NAME.to_string(),
                status: LOOKUP_ERROR_STATUS.to_string(),
                note: Some(e.to_string()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == LookupOutcome::Matched
    }
}

/// One line of the check-in log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub time: DateTime<Local>,
    pub payload: String,
    pub display_name: String,
    pub status: String,
    pub outcome: LookupOutcome,
}

impl HistoryRecord {
    pub fn new(time: DateTime<Local>, payload: impl Into<String>, view: &ResultView) -> Self {
        Self {
            time,
            payload: payload.into(),
            display_name: view.display_name.clone(),
            status: view.status.clone(),
            outcome: view.outcome,
        }
    }
}

/// Visual and audible cue for a finished lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFeedback {
    pub success: bool,
    pub region: Option<BoundingQuad>,
}

/// Renders scan results. Calls are fire-and-forget; the scan loop consumes
/// no return value.
pub trait PresentationSink: Send {
    fn show_current_result(&mut self, payload: &str, view: &ResultView, success: bool);

    fn append_history(&mut self, record: &HistoryRecord);

    /// Highlight the detected region and play a cue. Default: no-op.
    fn signal(&mut self, _feedback: &ScanFeedback) {}
}
