use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("capability not supported by this device: {0}")]
    UnsupportedCapability(&'static str),
    #[error("frame source reached the end of its stream")]
    EndOfStream,
    #[error("failed to read frame: {0}")]
    Read(String),
}

/// Which camera to prefer when the device offers more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera on handheld devices.
    #[default]
    Environment,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureConstraints {
    pub facing_mode: FacingMode,
    /// Preferred `(width, height)`; the device may pick something else.
    pub ideal_resolution: Option<(u32, u32)>,
}

/// What the device reported when it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub label: String,
    pub supports_torch: bool,
}

/// A live capture device feeding the scan loop.
///
/// Implementations own the underlying handle; `stop` must release it and be
/// safe to call repeatedly or before `start`.
pub trait FrameSource: Send {
    fn start(&mut self, constraints: &CaptureConstraints) -> Result<DeviceInfo, FrameSourceError>;

    /// Native dimensions of the current frame, or `None` until the device
    /// has produced one.
    fn current_frame_dimensions(&self) -> Option<(u32, u32)>;

    /// Copies out the current frame. `Ok(None)` means no frame is ready yet.
    fn snapshot(&mut self) -> Result<Option<Frame>, FrameSourceError>;

    fn set_torch(&mut self, _enabled: bool) -> Result<(), FrameSourceError> {
        Err(FrameSourceError::UnsupportedCapability("torch"))
    }

    fn stop(&mut self);
}
