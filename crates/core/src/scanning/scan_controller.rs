use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use thiserror::Error;

use crate::capture::domain::frame_source::{DeviceInfo, FrameSource, FrameSourceError};
use crate::decoding::domain::code_decoder::CodeDecoder;
use crate::lookup::domain::lookup_service::LookupService;
use crate::presentation::domain::presentation_sink::{
    HistoryRecord, PresentationSink, ResultView, ScanFeedback,
};
use crate::scanning::frame_clock::FrameClock;
use crate::scanning::history_log::HistoryLog;
use crate::scanning::lookup_dispatcher::{LookupCompletion, LookupDispatcher};
use crate::scanning::scan_config::ScannerConfig;
use crate::scanning::scan_logger::{NullScanLogger, ScanLogger};
use crate::scanning::suppression_store::SuppressionStore;
use crate::shared::scan_event::ScanEvent;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("device does not support {0}")]
    UnsupportedCapability(&'static str),
    #[error("device control failed: {0}")]
    DeviceControl(String),
    #[error("scanner is not running")]
    NotScanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Stopped,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The controller is not scanning; nothing ran.
    Stopped,
    /// The source has no frame yet.
    NotReady,
    /// A frame was decoded without finding a code, or the decoder failed.
    NoCode,
    /// A code was found but its payload is inside the suppression window.
    Suppressed,
    /// A payload was accepted and its lookup started.
    Dispatched,
    /// The source ran out of frames; the controller stopped itself.
    SourceEnded,
}

/// Requests a stop from outside the scan thread (signal handlers, UI).
///
/// The controller honors it at the start of its next tick.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives the capture → decode → suppress → lookup → present loop for one
/// check-in session.
///
/// All mutable state lives here and is touched only from the thread that
/// owns the controller. Lookups run on worker threads and are applied when
/// the owner calls [`tick`](Self::tick), [`drain_completions`](Self::drain_completions)
/// or [`settle`](Self::settle).
pub struct ScanController {
    config: ScannerConfig,
    source: Box<dyn FrameSource>,
    decoder: Box<dyn CodeDecoder>,
    sink: Box<dyn PresentationSink>,
    logger: Box<dyn ScanLogger>,
    dispatcher: LookupDispatcher,
    suppression: SuppressionStore,
    history: HistoryLog,
    state: ScanState,
    stop_requested: Arc<AtomicBool>,
    buffer_dims: Option<(u32, u32)>,
    device: Option<DeviceInfo>,
    ticks: u64,
    torch_unsupported_reported: bool,
}

impl ScanController {
    pub fn new(
        config: ScannerConfig,
        source: Box<dyn FrameSource>,
        decoder: Box<dyn CodeDecoder>,
        lookup: Arc<dyn LookupService>,
        sink: Box<dyn PresentationSink>,
    ) -> Self {
        Self {
            suppression: SuppressionStore::new(config.suppression_policy()),
            history: HistoryLog::new(config.history_capacity),
            dispatcher: LookupDispatcher::new(lookup),
            config,
            source,
            decoder,
            sink,
            logger: Box::new(NullScanLogger),
            state: ScanState::Idle,
            stop_requested: Arc::new(AtomicBool::new(false)),
            buffer_dims: None,
            device: None,
            ticks: 0,
            torch_unsupported_reported: false,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn ScanLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Opens the frame source. On failure the loop never starts and the
    /// source is left released.
    pub fn start(&mut self) -> Result<&DeviceInfo, ScanError> {
        if self.state != ScanState::Scanning {
            let constraints = self.config.capture_constraints();
            let device = match self.source.start(&constraints) {
                Ok(device) => device,
                Err(e) => {
                    self.source.stop();
                    log::error!("Could not start capture: {e}");
                    return Err(match e {
                        FrameSourceError::DeviceUnavailable(msg) => {
                            ScanError::DeviceUnavailable(msg)
                        }
                        other => ScanError::DeviceUnavailable(other.to_string()),
                    });
                }
            };

            self.logger
                .info(&format!("Scanner started on {}", device.label));
            self.stop_requested.store(false, Ordering::Relaxed);
            self.buffer_dims = None;
            self.state = ScanState::Scanning;
            self.device = Some(device);
        }
        self.device.as_ref().ok_or(ScanError::NotScanning)
    }

    /// Stops ticking and releases the frame source. Lookups already in
    /// flight are left to finish; see [`settle`](Self::settle).
    pub fn stop(&mut self) {
        self.stop_requested.store(true, Ordering::Relaxed);
        if self.state != ScanState::Scanning {
            return;
        }
        self.state = ScanState::Stopped;
        self.source.stop();
        self.buffer_dims = None;
        self.logger.info(&format!(
            "Scanner stopped after {} ticks, {} lookups pending",
            self.ticks,
            self.dispatcher.in_flight()
        ));
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop_requested))
    }

    /// Runs one scheduling step at time `now`.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.stop_requested.load(Ordering::Relaxed) {
            self.stop();
        }
        if self.state != ScanState::Scanning {
            return TickOutcome::Stopped;
        }

        self.ticks += 1;
        self.logger.tick(self.ticks);
        self.drain_completions();

        let Some(dims) = self.source.current_frame_dimensions() else {
            return TickOutcome::NotReady;
        };
        if self.buffer_dims != Some(dims) {
            log::debug!("Resizing scan buffer to {}x{}", dims.0, dims.1);
            self.buffer_dims = Some(dims);
        }

        let frame = match self.source.snapshot() {
            Ok(Some(frame)) => frame,
            Ok(None) => return TickOutcome::NotReady,
            Err(FrameSourceError::EndOfStream) => {
                self.logger.info("Frame source ended");
                self.stop();
                return TickOutcome::SourceEnded;
            }
            Err(e) => {
                log::trace!("No frame this tick: {e}");
                return TickOutcome::NotReady;
            }
        };

        let started = Instant::now();
        let decoded = self.decoder.decode(&frame, &self.config.decode_options());
        self.logger
            .timing("decode", started.elapsed().as_secs_f64() * 1000.0);

        match decoded {
            Ok(Some(payload)) => {
                let event = ScanEvent::new(payload.text, now).with_quad(payload.quad);
                self.handle_decoded(event)
            }
            Ok(None) => TickOutcome::NoCode,
            Err(e) => {
                log::trace!("Transient decode failure on frame {}: {e}", frame.index());
                TickOutcome::NoCode
            }
        }
    }

    /// Ticks on every beat of `clock` until the controller stops. Returns
    /// the number of ticks that ran.
    pub fn run_loop(&mut self, clock: &mut dyn FrameClock) -> u64 {
        let first = self.ticks;
        while self.is_scanning() {
            let now = clock.next_tick();
            if self.tick(now) == TickOutcome::Stopped {
                break;
            }
        }
        self.ticks - first
    }

    /// Applies every lookup that has already finished. Returns how many.
    pub fn drain_completions(&mut self) -> usize {
        let done = self.dispatcher.try_drain();
        let count = done.len();
        for completion in done {
            self.apply_completion(completion);
        }
        count
    }

    /// Waits up to `timeout` for in-flight lookups and applies them. Never
    /// restarts the loop. Returns how many were applied.
    pub fn settle(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = self.drain_completions();
        while self.dispatcher.in_flight() > 0 {
            let now = Instant::now();
            if now >= deadline {
                log::warn!(
                    "Gave up waiting for {} lookups",
                    self.dispatcher.in_flight()
                );
                break;
            }
            match self.dispatcher.wait_next(deadline - now) {
                Some(completion) => {
                    self.apply_completion(completion);
                    applied += 1;
                }
                None => continue,
            }
        }
        applied
    }

    /// Switches the torch. Unsupported devices are reported once; the loop
    /// is never affected.
    pub fn on_torch_toggle(&mut self, enabled: bool) -> Result<(), ScanError> {
        if self.state != ScanState::Scanning {
            return Err(ScanError::NotScanning);
        }
        match self.source.set_torch(enabled) {
            Ok(()) => {
                log::info!("Torch {}", if enabled { "on" } else { "off" });
                Ok(())
            }
            Err(FrameSourceError::UnsupportedCapability(capability)) => {
                if !self.torch_unsupported_reported {
                    self.torch_unsupported_reported = true;
                    log::warn!("This device does not support {capability}");
                }
                Err(ScanError::UnsupportedCapability(capability))
            }
            Err(e) => {
                log::warn!("Could not switch torch: {e}");
                Err(ScanError::DeviceControl(e.to_string()))
            }
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn suppression(&self) -> &SuppressionStore {
        &self.suppression
    }

    pub fn pending_lookups(&self) -> usize {
        self.dispatcher.in_flight()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn summarize(&self) {
        self.logger.summary();
    }

    fn handle_decoded(&mut self, event: ScanEvent) -> TickOutcome {
        self.logger.decoded(&event.payload);

        if !self.suppression.should_accept(&event.payload, event.timestamp) {
            log::debug!("Ignoring recent duplicate: {}", event.payload);
            self.logger.suppression(&event.payload, false);
            return TickOutcome::Suppressed;
        }

        self.suppression
            .record_accepted(&event.payload, event.timestamp);
        self.logger.suppression(&event.payload, true);
        self.logger
            .metric("suppression_entries", self.suppression.len() as f64);

        log::info!("Decoded: {}", event.payload);
        self.dispatcher.dispatch(event);
        self.logger
            .metric("in_flight", self.dispatcher.in_flight() as f64);
        TickOutcome::Dispatched
    }

    fn apply_completion(&mut self, completion: LookupCompletion) {
        let LookupCompletion {
            event,
            result,
            elapsed,
        } = completion;

        if let Err(e) = &result {
            log::warn!("Lookup failed for {}: {e}", event.payload);
        }

        let view = ResultView::from_lookup(&result);
        let success = view.is_success();
        self.logger
            .timing("lookup", elapsed.as_secs_f64() * 1000.0);
        self.logger.lookup_finished(&event.payload, view.outcome);

        self.sink.show_current_result(&event.payload, &view, success);
        self.sink.signal(&ScanFeedback {
            success,
            region: event.bounding_quad,
        });

        let record = HistoryRecord::new(Local::now(), event.payload, &view);
        self.sink.append_history(&record);
        self.history.append(record);
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        self.stop();
    }
}
