use std::io::Write;

use crate::presentation::domain::presentation_sink::{
    HistoryRecord, PresentationSink, ResultView, ScanFeedback,
};
use crate::shared::constants::DEFAULT_HISTORY_CAPACITY;

/// Renders results through the `log` facade, for terminals and headless runs.
///
/// With `beep` enabled, successful check-ins ring the terminal bell once and
/// failures twice.
pub struct LogPresentationSink {
    beep: bool,
    capacity: usize,
    lines: Vec<String>,
}

impl LogPresentationSink {
    pub fn new(beep: bool) -> Self {
        Self {
            beep,
            capacity: DEFAULT_HISTORY_CAPACITY,
            lines: Vec::new(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Rendered history lines, newest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Default for LogPresentationSink {
    fn default() -> Self {
        Self::new(false)
    }
}

/// `HH:MM:SS | payload | name | status`, with the local time of day.
pub fn format_history_line(record: &HistoryRecord) -> String {
    format!(
        "{} | {} | {} | {}",
        record.time.format("%H:%M:%S"),
        record.payload,
        record.display_name,
        record.status
    )
}

impl PresentationSink for LogPresentationSink {
    fn show_current_result(&mut self, payload: &str, view: &ResultView, success: bool) {
        let marker = if success { "OK" } else { "--" };
        match &view.note {
            Some(note) => log::info!(
                "[{marker}] {} ({payload}): {} - {note}",
                view.display_name,
                view.status
            ),
            None => log::info!("[{marker}] {} ({payload}): {}", view.display_name, view.status),
        }
    }

    fn append_history(&mut self, record: &HistoryRecord) {
        let line = format_history_line(record);
        log::debug!("history: {line}");
        self.lines.insert(0, line);
        self.lines.truncate(self.capacity);
    }

    fn signal(&mut self, feedback: &ScanFeedback) {
        if let Some(quad) = &feedback.region {
            let (x, y, w, h) = quad.bounding_box();
            log::debug!(
                "highlight {} region at ({x}, {y}) {w}x{h}",
                if feedback.success { "success" } else { "failure" }
            );
        }
        if self.beep {
            let bell = if feedback.success { "\x07" } else { "\x07\x07" };
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(bell.as_bytes());
            let _ = stderr.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::domain::presentation_sink::LookupOutcome;
    use chrono::{Local, TimeZone};

    fn record(payload: &str, secs: u32) -> HistoryRecord {
        HistoryRecord {
            time: Local.with_ymd_and_hms(2024, 5, 6, 9, 5, secs).unwrap(),
            payload: payload.to_string(),
            display_name: "María García".to_string(),
            status: "Present".to_string(),
            outcome: LookupOutcome::Matched,
        }
    }

    #[test]
    fn test_history_line_uses_local_time_of_day() {
        let line = format_history_line(&record("ALU123", 7));
        assert_eq!(line, "09:05:07 | ALU123 | María García | Present");
    }

    #[test]
    fn test_history_lines_newest_first() {
        let mut sink = LogPresentationSink::default();
        sink.append_history(&record("A", 1));
        sink.append_history(&record("B", 2));
        assert_eq!(sink.lines().len(), 2);
        assert!(sink.lines()[0].contains("| B |"));
        assert!(sink.lines()[1].contains("| A |"));
    }

    #[test]
    fn test_visible_history_is_capped() {
        let mut sink = LogPresentationSink::new(false).with_capacity(3);
        for i in 0..5 {
            sink.append_history(&record(&format!("P{i}"), i));
        }
        assert_eq!(sink.lines().len(), 3);
        assert!(sink.lines()[0].contains("| P4 |"));
        assert!(sink.lines()[2].contains("| P2 |"));
    }

    #[test]
    fn test_signal_without_beep_or_region_is_silent() {
        let mut sink = LogPresentationSink::new(false);
        sink.signal(&ScanFeedback {
            success: true,
            region: None,
        });
    }
}
