use anyhow::{anyhow, Result};

use crate::detect::backend::DetectorBackend;
use crate::detect::color::ColorRange;
use crate::detect::locate::{ObjectLocator, DEFAULT_MIN_AREA};
use crate::detect::mask::Mask;
use crate::detect::result::DetectionResult;
use crate::detect::segment::{ColorSegmenter, DEFAULT_MORPH_ITERATIONS};
use crate::frame::Frame;

/// Configuration for the color-blob backend.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorBlobConfig {
    /// Target color.
    pub range: ColorRange,
    /// Smallest region accepted as the tracked object, in pixels.
    pub min_area: u64,
    /// Erosion passes, followed by the same number of dilation passes.
    pub morph_iterations: u32,
}

impl Default for ColorBlobConfig {
    fn default() -> Self {
        Self {
            range: ColorRange::bright_red(),
            min_area: DEFAULT_MIN_AREA,
            morph_iterations: DEFAULT_MORPH_ITERATIONS,
        }
    }
}

/// Color segmentation followed by a largest-region search.
///
/// The mask and locator buffers are sized on the first frame and overwritten on
/// every later frame of the same dimensions.
pub struct ColorBlobBackend {
    segmenter: ColorSegmenter,
    locator: ObjectLocator,
    mask: Mask,
}

impl ColorBlobBackend {
    pub fn new(config: ColorBlobConfig) -> Self {
        Self {
            segmenter: ColorSegmenter::new(config.range, config.morph_iterations),
            locator: ObjectLocator::new(config.min_area),
            mask: Mask::empty(),
        }
    }

    /// Mask produced by the most recent `detect` call.
    pub fn last_mask(&self) -> &Mask {
        &self.mask
    }
}

impl DetectorBackend for ColorBlobBackend {
    fn name(&self) -> &'static str {
        "color_blob"
    }

    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult> {
        self.segmenter.segment(frame, &mut self.mask);
        debug_assert_eq!(
            (self.mask.width(), self.mask.height()),
            (frame.width, frame.height)
        );
        Ok(self.locator.locate(&self.mask))
    }

    fn warm_up(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(anyhow!("cannot warm up for {}x{} frames", width, height));
        }
        self.mask.reset(width, height);
        log::debug!(
            "{}: buffers sized for {}x{} (min_area={}, morph_iterations={})",
            self.name(),
            width,
            height,
            self.locator.min_area(),
            self.segmenter.iterations()
        );
        Ok(())
    }
}
