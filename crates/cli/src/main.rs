mod settings;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use attendance_scan_core::capture::infrastructure::image_sequence_source::ImageSequenceSource;
use attendance_scan_core::decoding::infrastructure::rqrr_decoder::RqrrDecoder;
use attendance_scan_core::lookup::domain::lookup_service::{LookupError, LookupService};
use attendance_scan_core::lookup::infrastructure::http_lookup::HttpLookupService;
use attendance_scan_core::lookup::infrastructure::roster_lookup::RosterLookupService;
use attendance_scan_core::presentation::infrastructure::log_presentation_sink::LogPresentationSink;
use attendance_scan_core::scanning::frame_clock::IntervalClock;
use attendance_scan_core::scanning::scan_controller::ScanController;
use attendance_scan_core::scanning::scan_logger::StdoutScanLogger;

use settings::Overrides;

/// QR code attendance check-in.
#[derive(Parser)]
#[command(name = "attendance-scan")]
struct Cli {
    /// Directory of camera frames, scanned in file-name order.
    #[arg(long)]
    frames: PathBuf,

    /// Ticks each frame stays on screen.
    #[arg(long, default_value = "15")]
    hold_frames: usize,

    /// Loop over the frames until interrupted.
    #[arg(long)]
    repeat: bool,

    /// JSON roster mapping payload to attendee (defaults to a demo roster).
    #[arg(long, conflicts_with = "lookup_url")]
    roster: Option<PathBuf>,

    /// Base URL of an attendee lookup service.
    #[arg(long)]
    lookup_url: Option<String>,

    /// Artificial delay added to roster lookups, in milliseconds.
    #[arg(long, default_value = "0", conflicts_with = "lookup_url")]
    latency_ms: u64,

    /// Scanner config file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Duplicate suppression window in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Accept each payload only once per session.
    #[arg(long)]
    session_once: bool,

    /// Number of check-ins kept in the history.
    #[arg(long)]
    history_cap: Option<usize>,

    /// Target scan rate in ticks per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Switch the torch on after starting.
    #[arg(long)]
    torch: bool,

    /// Ring the terminal bell on each result.
    #[arg(long)]
    beep: bool,

    /// Write the check-in history to this JSON file on exit.
    #[arg(long)]
    history_out: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            duplicate_timeout_ms: self.timeout_ms,
            session_once: self.session_once,
            history_capacity: self.history_cap,
            target_fps: self.fps,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = settings::apply_overrides(
        settings::load_config(cli.config.as_deref())?,
        &cli.overrides(),
    )?;
    let lookup = build_lookup(&cli)?;

    let source = ImageSequenceSource::new(&cli.frames)
        .with_hold_frames(cli.hold_frames)
        .with_repeat(cli.repeat);
    let sink = LogPresentationSink::new(cli.beep).with_capacity(config.history_capacity);

    let mut controller = ScanController::new(
        config.clone(),
        Box::new(source),
        Box::new(RqrrDecoder::new()),
        lookup,
        Box::new(sink),
    )
    .with_logger(Box::new(StdoutScanLogger::default()));

    let device = controller.start()?;
    log::info!(
        "Scanning {} (torch {})",
        device.label,
        if device.supports_torch { "available" } else { "unavailable" }
    );

    let stop = controller.stop_handle();
    ctrlc::set_handler(move || stop.request_stop())?;

    if cli.torch {
        if let Err(e) = controller.on_torch_toggle(true) {
            log::warn!("Torch not switched on: {e}");
        }
    }

    let mut clock = IntervalClock::new(config.tick_interval());
    controller.run_loop(&mut clock);
    controller.stop();

    let pending = controller.pending_lookups();
    if pending > 0 {
        log::info!("Waiting for {pending} pending lookups");
    }
    controller.settle(config.settle_timeout());
    controller.summarize();

    if let Some(path) = &cli.history_out {
        settings::write_history(path, &controller.history().to_vec())?;
        log::info!("History written to {}", path.display());
    }

    Ok(())
}

fn build_lookup(cli: &Cli) -> Result<Arc<dyn LookupService>, LookupError> {
    let latency = Duration::from_millis(cli.latency_ms);
    if let Some(url) = &cli.lookup_url {
        log::info!("Looking up attendees at {url}");
        return Ok(Arc::new(HttpLookupService::new(url)?));
    }
    let roster = match &cli.roster {
        Some(path) => RosterLookupService::from_json_file(path)?,
        None => {
            log::info!("No roster given, using the demo roster");
            RosterLookupService::demo()
        }
    };
    log::info!("Roster has {} attendees", roster.len());
    Ok(Arc::new(roster.with_latency(latency)))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames.display()).into());
    }
    if cli.hold_frames == 0 {
        return Err("--hold-frames must be at least 1".into());
    }
    if let Some(roster) = &cli.roster {
        if !roster.is_file() {
            return Err(format!("Roster file not found: {}", roster.display()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(["attendance-scan", "--frames", "frames"].iter().chain(args))
    }

    #[test]
    fn test_latency_with_lookup_url_is_rejected() {
        let err = parse(&["--lookup-url", "http://localhost:8080", "--latency-ms", "5"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_lookup_url_alone_is_accepted() {
        let cli = parse(&["--lookup-url", "http://localhost:8080"]).unwrap();
        assert_eq!(cli.lookup_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cli.latency_ms, 0);
    }

    #[test]
    fn test_latency_applies_to_roster() {
        let cli = parse(&["--roster", "roster.json", "--latency-ms", "5"]).unwrap();
        assert_eq!(cli.latency_ms, 5);
    }

    #[test]
    fn test_roster_with_lookup_url_is_rejected() {
        let err = parse(&["--roster", "r.json", "--lookup-url", "http://localhost:8080"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
