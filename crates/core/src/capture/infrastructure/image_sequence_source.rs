use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::{
    CaptureConstraints, DeviceInfo, FrameSource, FrameSourceError,
};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Replays a directory of still images as if it were a live camera.
///
/// Each image stays "in view" for `hold_frames` snapshots, so a code held in
/// front of the lens for a while is seen on many consecutive ticks. With
/// `repeat` the sequence wraps around instead of ending.
pub struct ImageSequenceSource {
    dir: PathBuf,
    hold_frames: usize,
    repeat: bool,
    paths: Vec<PathBuf>,
    current: Option<Frame>,
    position: usize,
    served: usize,
    frame_index: usize,
    running: bool,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            hold_frames: 1,
            repeat: false,
            paths: Vec::new(),
            current: None,
            position: 0,
            served: 0,
            frame_index: 0,
            running: false,
        }
    }

    pub fn with_hold_frames(mut self, hold_frames: usize) -> Self {
        self.hold_frames = hold_frames.max(1);
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn load(&self, path: &Path) -> Result<Frame, FrameSourceError> {
        let img = image::open(path)
            .map_err(|e| FrameSourceError::Read(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, 3, self.frame_index))
    }

    /// Moves to the next readable image. Unreadable files are skipped so a
    /// stale frame is never replayed in their place.
    fn advance(&mut self) -> Result<(), FrameSourceError> {
        self.current = None;
        self.served = 0;
        for _ in 0..self.paths.len() {
            self.position += 1;
            if self.position >= self.paths.len() {
                if !self.repeat {
                    return Err(FrameSourceError::EndOfStream);
                }
                self.position = 0;
            }
            match self.load(&self.paths[self.position]) {
                Ok(frame) => {
                    self.current = Some(frame);
                    return Ok(());
                }
                Err(e) => log::warn!("Skipping unreadable frame: {e}"),
            }
        }
        log::warn!("No readable images left in {}", self.dir.display());
        Err(FrameSourceError::EndOfStream)
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, FrameSourceError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| FrameSourceError::DeviceUnavailable(format!("{}: {e}", dir.display())))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_image(path))
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn start(&mut self, _constraints: &CaptureConstraints) -> Result<DeviceInfo, FrameSourceError> {
        let paths = list_images(&self.dir)?;
        if paths.is_empty() {
            return Err(FrameSourceError::DeviceUnavailable(format!(
                "no images found in {}",
                self.dir.display()
            )));
        }

        self.paths = paths;
        self.position = 0;
        self.served = 0;
        self.frame_index = 0;
        match self.load(&self.paths[0]) {
            Ok(frame) => self.current = Some(frame),
            Err(e) => {
                log::warn!("Skipping unreadable frame: {e}");
                if self.advance().is_err() {
                    self.paths.clear();
                    return Err(FrameSourceError::DeviceUnavailable(format!(
                        "no readable images in {}",
                        self.dir.display()
                    )));
                }
            }
        }
        self.running = true;

        log::info!(
            "Image sequence started: {} images from {}",
            self.paths.len(),
            self.dir.display()
        );

        Ok(DeviceInfo {
            label: format!("image sequence {}", self.dir.display()),
            supports_torch: false,
        })
    }

    fn current_frame_dimensions(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(Frame::dimensions)
    }

    fn snapshot(&mut self) -> Result<Option<Frame>, FrameSourceError> {
        if !self.running {
            return Ok(None);
        }
        if self.served >= self.hold_frames {
            self.advance()?;
        }

        let Some(frame) = self.current.as_ref() else {
            return Ok(None);
        };
        let snapshot = Frame::new(
            frame.data().to_vec(),
            frame.width(),
            frame.height(),
            frame.channels(),
            self.frame_index,
        );
        self.served += 1;
        self.frame_index += 1;
        Ok(Some(snapshot))
    }

    fn stop(&mut self) {
        if self.running {
            log::debug!("Image sequence stopped after {} frames", self.frame_index);
        }
        self.running = false;
        self.current = None;
        self.paths.clear();
    }
}
