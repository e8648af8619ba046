use std::collections::HashMap;
use std::time::Instant;

use crate::presentation::domain::presentation_sink::LookupOutcome;

/// Cross-cutting observer for scan-loop events.
///
/// Keeps the controller free of output concerns: the CLI aggregates and
/// summarises, tests discard.
pub trait ScanLogger: Send {
    /// Report how many ticks have run so far.
    fn tick(&mut self, count: u64);

    /// Record how long a named stage took (e.g. `decode`, `lookup`).
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. lookups in flight).
    fn metric(&mut self, name: &str, value: f64);

    /// A payload came out of the decoder.
    fn decoded(&mut self, _payload: &str) {}

    /// A decoded payload was accepted (`true`) or suppressed (`false`).
    fn suppression(&mut self, _payload: &str, _accepted: bool) {}

    /// A lookup finished and was applied.
    fn lookup_finished(&mut self, _payload: &str, _outcome: LookupOutcome) {}

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullScanLogger;

impl ScanLogger for NullScanLogger {
    fn tick(&mut self, _count: u64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanCounters {
    pub decoded: u64,
    pub accepted: u64,
    pub suppressed: u64,
    pub matched: u64,
    pub not_found: u64,
    pub failed: u64,
}

/// CLI-oriented logger that tracks per-stage timing, metrics and outcome
/// counters, and prints a summary when the session ends.
///
/// Tick progress is logged every `throttle_ticks` ticks.
pub struct StdoutScanLogger {
    throttle_ticks: u64,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    counters: ScanCounters,
    start_time: Instant,
    ticks: u64,
    messages: Vec<String>,
}

impl StdoutScanLogger {
    pub fn new(throttle_ticks: u64) -> Self {
        Self {
            throttle_ticks: throttle_ticks.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            counters: ScanCounters::default(),
            start_time: Instant::now(),
            ticks: 0,
            messages: Vec::new(),
        }
    }

    pub fn counters(&self) -> ScanCounters {
        self.counters
    }

    /// Returns the formatted summary string, or `None` if nothing ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.ticks == 0 && self.timings.is_empty() && self.counters == ScanCounters::default()
        {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let c = self.counters;
        let mut lines = vec![
            format!(
                "Scan summary ({} ticks, {:.1}s total):",
                self.ticks,
                elapsed_ms / 1000.0
            ),
            format!(
                "  decoded {}  accepted {}  suppressed {}",
                c.decoded, c.accepted, c.suppressed
            ),
            format!(
                "  matched {}  not found {}  failed {}",
                c.matched, c.not_found, c.failed
            ),
        ];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({} samples)",
                durations.len()
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            let max = values.iter().cloned().fold(0.0, f64::max);
            lines.push(format!("  {name}: avg {:.1}  max {max:.0}", mean(values)));
        }

        if self.ticks > 0 && elapsed_ms > 0.0 {
            let fps = self.ticks as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Tick rate: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutScanLogger {
    fn default() -> Self {
        Self::new(300)
    }
}

impl ScanLogger for StdoutScanLogger {
    fn tick(&mut self, count: u64) {
        self.ticks = count;
        if count % self.throttle_ticks == 0 {
            log::info!(
                "Scanning: {count} ticks, {} check-ins",
                self.counters.accepted
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn decoded(&mut self, _payload: &str) {
        self.counters.decoded += 1;
    }

    fn suppression(&mut self, _payload: &str, accepted: bool) {
        if accepted {
            self.counters.accepted += 1;
        } else {
            self.counters.suppressed += 1;
        }
    }

    fn lookup_finished(&mut self, _payload: &str, outcome: LookupOutcome) {
        match outcome {
            LookupOutcome::Matched => self.counters.matched += 1,
            LookupOutcome::NotFound => self.counters.not_found += 1,
            LookupOutcome::Failed => self.counters.failed += 1,
        }
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
