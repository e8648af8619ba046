use std::collections::VecDeque;

use crate::presentation::domain::presentation_sink::HistoryRecord;

/// Bounded check-in log, newest entry first.
///
/// Inserting beyond `capacity` evicts exactly the oldest entry.
pub struct HistoryLog {
    entries: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn append(&mut self, record: HistoryRecord) {
        self.entries.push_front(record);
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<HistoryRecord> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::domain::presentation_sink::LookupOutcome;
    use crate::shared::constants::DEFAULT_HISTORY_CAPACITY;
    use chrono::Local;

    fn record(payload: &str) -> HistoryRecord {
        HistoryRecord {
            time: Local::now(),
            payload: payload.to_string(),
            display_name: "Someone".to_string(),
            status: "Present".to_string(),
            outcome: LookupOutcome::Matched,
        }
    }

    fn payloads(log: &HistoryLog) -> Vec<String> {
        log.entries().map(|r| r.payload.clone()).collect()
    }

    #[test]
    fn test_entries_are_newest_first() {
        let mut log = HistoryLog::new(5);
        log.append(record("A"));
        log.append(record("B"));
        log.append(record("C"));
        assert_eq!(payloads(&log), vec!["C", "B", "A"]);
        assert_eq!(log.latest().unwrap().payload, "C");
    }

    #[test]
    fn test_overflow_evicts_exactly_the_oldest() {
        let mut log = HistoryLog::new(DEFAULT_HISTORY_CAPACITY);
        for i in 0..DEFAULT_HISTORY_CAPACITY {
            log.append(record(&format!("P{i}")));
        }
        assert_eq!(log.len(), 30);

        log.append(record("P30"));

        assert_eq!(log.len(), 30);
        let all = payloads(&log);
        assert_eq!(all.first().unwrap(), "P30");
        assert_eq!(all.last().unwrap(), "P1");
        assert!(!all.contains(&"P0".to_string()));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut log = HistoryLog::new(3);
        for i in 0..100 {
            log.append(record(&format!("P{i}")));
            assert!(log.len() <= 3);
        }
        assert_eq!(payloads(&log), vec!["P99", "P98", "P97"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped_to_one() {
        let mut log = HistoryLog::new(0);
        log.append(record("A"));
        log.append(record("B"));
        assert_eq!(log.capacity(), 1);
        assert_eq!(payloads(&log), vec!["B"]);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut log = HistoryLog::new(usize::MAX);
        log.append(record("A"));
        assert_eq!(log.capacity(), usize::MAX);
        assert_eq!(payloads(&log), vec!["A"]);
    }

    #[test]
    fn test_empty_log() {
        let log = HistoryLog::new(30);
        assert!(log.is_empty());
        assert!(log.latest().is_none());
        assert!(log.to_vec().is_empty());
    }
}
