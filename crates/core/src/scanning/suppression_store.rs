use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::shared::constants::MIN_SWEEP_TRIGGER;

/// How repeated payloads are filtered before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionPolicy {
    /// Ignore a payload for `timeout` after it was last accepted. Entries
    /// idle for longer than `timeout * sweep_multiplier` are forgotten.
    Windowed {
        timeout: Duration,
        sweep_multiplier: u32,
    },
    /// Accept each payload at most once per session.
    SessionOnce,
}

/// Remembers recently accepted payloads.
///
/// Sweeping is opportunistic: `record_accepted` runs one only when the table
/// has doubled since the last sweep or a full sweep threshold has passed, so
/// the per-call cost stays amortized O(1) and an idle scanner does no work.
pub struct SuppressionStore {
    policy: SuppressionPolicy,
    last_seen: HashMap<String, Instant>,
    last_sweep: Option<Instant>,
    len_after_sweep: usize,
}

impl SuppressionStore {
    pub fn new(policy: SuppressionPolicy) -> Self {
        Self {
            policy,
            last_seen: HashMap::new(),
            last_sweep: None,
            len_after_sweep: 0,
        }
    }

    pub fn policy(&self) -> SuppressionPolicy {
        self.policy
    }

    pub fn should_accept(&self, payload: &str, now: Instant) -> bool {
        match (self.policy, self.last_seen.get(payload)) {
            (_, None) => true,
            (SuppressionPolicy::SessionOnce, Some(_)) => false,
            (SuppressionPolicy::Windowed { timeout, .. }, Some(&last)) => {
                now.saturating_duration_since(last) >= timeout
            }
        }
    }

    pub fn record_accepted(&mut self, payload: &str, now: Instant) {
        match self.last_seen.get_mut(payload) {
            Some(last) => *last = now,
            None => {
                self.last_seen.insert(payload.to_string(), now);
            }
        }

        if self.sweep_due(now) {
            let removed = self.sweep(now);
            if removed > 0 {
                log::debug!(
                    "Suppression sweep dropped {removed} entries, {} remain",
                    self.last_seen.len()
                );
            }
        }
    }

    /// Drops entries idle for longer than the sweep threshold. Returns how
    /// many were removed. Session-once entries are never swept.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let Some(threshold) = self.sweep_threshold() else {
            return 0;
        };
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) <= threshold);
        self.last_sweep = Some(now);
        self.len_after_sweep = self.last_seen.len();
        before - self.last_seen.len()
    }

    pub fn sweep_threshold(&self) -> Option<Duration> {
        match self.policy {
            SuppressionPolicy::Windowed {
                timeout,
                sweep_multiplier,
            } => Some(timeout.checked_mul(sweep_multiplier).unwrap_or(Duration::MAX)),
            SuppressionPolicy::SessionOnce => None,
        }
    }

    pub fn last_seen(&self, payload: &str) -> Option<Instant> {
        self.last_seen.get(payload).copied()
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
        self.last_sweep = None;
        self.len_after_sweep = 0;
    }

    fn sweep_due(&self, now: Instant) -> bool {
        let Some(threshold) = self.sweep_threshold() else {
            return false;
        };
        let grown = self.last_seen.len() >= MIN_SWEEP_TRIGGER.max(self.len_after_sweep * 2);
        let stale = match self.last_sweep {
            Some(at) => now.saturating_duration_since(at) >= threshold,
            None => true,
        };
        grown || stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn windowed() -> SuppressionStore {
        SuppressionStore::new(SuppressionPolicy::Windowed {
            timeout: TIMEOUT,
            sweep_multiplier: 6,
        })
    }

    fn secs(t0: Instant, s: u64) -> Instant {
        t0 + Duration::from_secs(s)
    }

    #[test]
    fn test_unknown_payload_is_accepted() {
        let store = windowed();
        assert!(store.should_accept("ALU123", Instant::now()));
    }

    #[rstest]
    #[case::immediately(0, false)]
    #[case::inside_window(2, false)]
    #[case::just_before_expiry(4, false)]
    #[case::at_expiry(5, true)]
    #[case::after_expiry(6, true)]
    fn test_windowed_acceptance(#[case] after_secs: u64, #[case] expected: bool) {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("ALU123", t0);
        assert_eq!(store.should_accept("ALU123", secs(t0, after_secs)), expected);
    }

    #[test]
    fn test_reacceptance_updates_last_seen() {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("ALU123", t0);
        store.record_accepted("ALU123", secs(t0, 6));

        assert_eq!(store.last_seen("ALU123"), Some(secs(t0, 6)));
        assert!(!store.should_accept("ALU123", secs(t0, 8)));
        assert!(store.should_accept("ALU123", secs(t0, 11)));
    }

    #[test]
    fn test_other_payloads_are_independent() {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("ALU123", t0);
        assert!(store.should_accept("ALU456", secs(t0, 1)));
    }

    #[rstest]
    #[case(1)]
    #[case(60)]
    #[case(86_400)]
    fn test_session_once_never_reaccepts(#[case] after_secs: u64) {
        let t0 = Instant::now();
        let mut store = SuppressionStore::new(SuppressionPolicy::SessionOnce);
        store.record_accepted("ALU123", t0);
        assert!(!store.should_accept("ALU123", secs(t0, after_secs)));
    }

    #[test]
    fn test_session_once_entries_survive_sweep() {
        let t0 = Instant::now();
        let mut store = SuppressionStore::new(SuppressionPolicy::SessionOnce);
        store.record_accepted("ALU123", t0);
        assert_eq!(store.sweep(secs(t0, 10_000)), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired_entries() {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("OLD", t0);
        store.record_accepted("EDGE", secs(t0, 10));
        store.record_accepted("NEW", secs(t0, 25));

        // threshold is 30s: OLD is 40s idle, EDGE exactly 30s, NEW 15s
        let removed = store.sweep(secs(t0, 40));

        assert_eq!(removed, 1);
        assert!(store.last_seen("OLD").is_none());
        assert!(store.last_seen("EDGE").is_some());
        assert!(store.last_seen("NEW").is_some());
    }

    #[test]
    fn test_sweep_never_removes_active_entries() {
        let t0 = Instant::now();
        let mut store = windowed();
        for i in 0..10 {
            store.record_accepted(&format!("P{i}"), secs(t0, i));
        }
        assert_eq!(store.sweep(secs(t0, 10)), 0);
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_record_accepted_sweeps_when_threshold_elapsed() {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("OLD", t0);
        store.record_accepted("NEW", secs(t0, 31));
        assert!(store.last_seen("OLD").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_record_accepted_does_not_sweep_every_call() {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("A", t0);
        store.sweep(secs(t0, 20));

        // A is expired at t0+40, but the last sweep was only 20s ago
        store.record_accepted("B", secs(t0, 40));
        assert_eq!(store.len(), 2);

        assert_eq!(store.sweep(secs(t0, 40)), 1);
        assert!(store.last_seen("A").is_none());
    }

    #[test]
    fn test_record_accepted_sweeps_when_table_doubles() {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("STALE", t0);
        store.sweep(secs(t0, 25));
        for i in 0..MIN_SWEEP_TRIGGER as u64 {
            store.record_accepted(&format!("P{i}"), secs(t0, 40));
        }
        assert!(store.last_seen("STALE").is_none());
    }

    #[test]
    fn test_threshold_is_timeout_times_multiplier() {
        assert_eq!(windowed().sweep_threshold(), Some(Duration::from_secs(30)));
        assert_eq!(
            SuppressionStore::new(SuppressionPolicy::SessionOnce).sweep_threshold(),
            None
        );
    }

    #[test]
    fn test_threshold_saturates_instead_of_overflowing() {
        let t0 = Instant::now();
        let mut store = SuppressionStore::new(SuppressionPolicy::Windowed {
            timeout: Duration::from_millis(u64::MAX),
            sweep_multiplier: u32::MAX,
        });
        assert_eq!(store.sweep_threshold(), Some(Duration::MAX));

        store.record_accepted("ALU123", t0);
        assert_eq!(store.sweep(secs(t0, 3600)), 0);
        assert!(!store.should_accept("ALU123", secs(t0, 3600)));
    }

    #[test]
    fn test_clear_forgets_everything() {
        let t0 = Instant::now();
        let mut store = windowed();
        store.record_accepted("ALU123", t0);
        store.clear();
        assert!(store.is_empty());
        assert!(store.should_accept("ALU123", t0));
    }
}
