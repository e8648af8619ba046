/// Window during which a repeated payload is ignored.
pub const DEFAULT_DUPLICATE_TIMEOUT_MS: u64 = 5_000;

/// Suppression entries older than `timeout * SWEEP_MULTIPLIER` are dropped.
pub const DEFAULT_SWEEP_MULTIPLIER: u32 = 6;

pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

pub const DEFAULT_TARGET_FPS: u32 = 30;

/// How long the CLI waits for in-flight lookups after the loop stops.
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 2_000;

/// Upper bounds accepted from configuration.
pub const MAX_DUPLICATE_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1_000;
pub const MAX_SWEEP_MULTIPLIER: u32 = 1_000;
pub const MAX_HISTORY_CAPACITY: usize = 10_000;
pub const MAX_TARGET_FPS: u32 = 240;
pub const MAX_SETTLE_TIMEOUT_MS: u64 = 10 * 60 * 1_000;

/// Table size below which the suppression store never sweeps on insert.
pub const MIN_SWEEP_TRIGGER: usize = 64;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";
pub const NOT_REGISTERED_STATUS: &str = "Not registered";
pub const LOOKUP_ERROR_STATUS: &str = "Lookup error";
