use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::lookup::domain::lookup_service::{LookupError, LookupResult, LookupService};
use crate::shared::scan_event::ScanEvent;

/// A finished lookup waiting to be applied on the scan thread.
pub struct LookupCompletion {
    pub event: ScanEvent,
    pub result: Result<LookupResult, LookupError>,
    pub elapsed: Duration,
}

/// Runs lookups off the scan thread and hands results back over a channel.
///
/// Each accepted payload gets its own worker, so a slow lookup never holds
/// up a later one; completions arrive in completion order.
pub struct LookupDispatcher {
    service: Arc<dyn LookupService>,
    tx: Sender<LookupCompletion>,
    rx: Receiver<LookupCompletion>,
    in_flight: usize,
}

impl LookupDispatcher {
    pub fn new(service: Arc<dyn LookupService>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<LookupCompletion>();
        Self {
            service,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, event: ScanEvent) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let started = Instant::now();
            let result = service.lookup(&event.payload);
            let _ = tx.send(LookupCompletion {
                event,
                result,
                elapsed: started.elapsed(),
            });
        });
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Collects every completion that is already available without blocking.
    pub fn try_drain(&mut self) -> Vec<LookupCompletion> {
        let done: Vec<LookupCompletion> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    /// Blocks up to `timeout` for the next completion. Returns `None` right
    /// away when nothing is in flight.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<LookupCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.in_flight -= 1;
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::domain::lookup_service::AttendeeRecord;
    use std::collections::HashMap;

    /// Answers after a per-payload delay.
    struct DelayedLookup {
        delays: HashMap<String, Duration>,
    }

    impl LookupService for DelayedLookup {
        fn lookup(&self, payload: &str) -> Result<LookupResult, LookupError> {
            if let Some(delay) = self.delays.get(payload) {
                thread::sleep(*delay);
            }
            if payload == "FAIL" {
                return Err(LookupError::Unavailable("offline".into()));
            }
            Ok(LookupResult::found(AttendeeRecord::new(payload, "", "Present")))
        }
    }

    fn dispatcher(delays: &[(&str, u64)]) -> LookupDispatcher {
        let delays = delays
            .iter()
            .map(|(p, ms)| (p.to_string(), Duration::from_millis(*ms)))
            .collect();
        LookupDispatcher::new(Arc::new(DelayedLookup { delays }))
    }

    fn event(payload: &str) -> ScanEvent {
        ScanEvent::new(payload, Instant::now())
    }

    #[test]
    fn test_wait_next_returns_none_when_idle() {
        let mut d = dispatcher(&[]);
        assert!(d.wait_next(Duration::from_millis(10)).is_none());
        assert!(d.try_drain().is_empty());
    }

    #[test]
    fn test_dispatch_tracks_in_flight() {
        let mut d = dispatcher(&[]);
        d.dispatch(event("A"));
        d.dispatch(event("B"));
        assert_eq!(d.in_flight(), 2);

        let first = d.wait_next(Duration::from_secs(2)).unwrap();
        let second = d.wait_next(Duration::from_secs(2)).unwrap();
        assert!(first.result.is_ok());
        assert!(second.result.is_ok());
        assert_eq!(d.in_flight(), 0);
    }

    #[test]
    fn test_completion_order_follows_completion_not_submission() {
        let mut d = dispatcher(&[("SLOW", 200), ("FAST", 0)]);
        d.dispatch(event("SLOW"));
        d.dispatch(event("FAST"));

        let first = d.wait_next(Duration::from_secs(2)).unwrap();
        let second = d.wait_next(Duration::from_secs(2)).unwrap();
        assert_eq!(first.event.payload, "FAST");
        assert_eq!(second.event.payload, "SLOW");
    }

    #[test]
    fn test_failures_are_delivered_as_completions() {
        let mut d = dispatcher(&[]);
        d.dispatch(event("FAIL"));
        let done = d.wait_next(Duration::from_secs(2)).unwrap();
        assert!(matches!(done.result, Err(LookupError::Unavailable(_))));
    }

    #[test]
    fn test_try_drain_does_not_block_on_pending() {
        let mut d = dispatcher(&[("SLOW", 300)]);
        d.dispatch(event("SLOW"));
        let started = Instant::now();
        assert!(d.try_drain().is_empty());
        assert!(started.elapsed() < Duration::from_millis(200));
        assert_eq!(d.in_flight(), 1);
        assert!(d.wait_next(Duration::from_secs(2)).is_some());
    }
}
