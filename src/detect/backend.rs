use anyhow::Result;

use crate::detect::result::DetectionResult;
use crate::frame::Frame;

/// Detector backend trait.
///
/// A backend turns one frame into at most one tracked region. Backends may keep
/// scratch buffers between calls but must not carry detection state from one
/// frame into the next: every frame is located independently.
pub trait DetectorBackend {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Locate the tracked object in a frame.
    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult>;

    /// Optional warm-up hook, called once before the first frame.
    fn warm_up(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }
}
