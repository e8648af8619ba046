use std::time::{Duration, Instant};

/// Per-frame scheduling primitive driving the scan loop.
pub trait FrameClock {
    /// Blocks until the next tick is due and returns its timestamp.
    fn next_tick(&mut self) -> Instant;
}

/// Paces ticks at a fixed interval, like a display refresh callback.
///
/// A tick that overruns its slot is not made up for; the next one is
/// scheduled one interval after it.
pub struct IntervalClock {
    interval: Duration,
    next_due: Option<Instant>,
}

impl IntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameClock for IntervalClock {
    fn next_tick(&mut self) -> Instant {
        let now = Instant::now();
        let due = match self.next_due {
            Some(due) if due > now => {
                std::thread::sleep(due - now);
                due
            }
            _ => now,
        };
        self.next_due = Some(due + self.interval);
        due
    }
}
