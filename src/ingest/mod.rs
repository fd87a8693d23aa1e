//! Frame ingestion sources.
//!
//! This module provides different sources for frames:
//! - Synthetic scenes (`stub://name`) for demos and tests
//! - Raw packed video from a file or stdin (`raw:path`, `raw:-`)
//! - Still-image sequences from a directory (`images:dir`)
//! - USB/V4L2 devices (`/dev/videoN`, feature: ingest-v4l2)
//!
//! Every source yields `Frame`s of the session's fixed dimensions and signals
//! end-of-stream with `Ok(None)`. A read failure is returned as an error and
//! ends the session; sources do not retry.

pub mod images;
mod normalize;
pub mod raw;
pub mod synthetic;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

use anyhow::{anyhow, Result};

use crate::config::SourceSettings;
use crate::frame::Frame;

pub use images::{ImageSequenceConfig, ImageSequenceSource};
pub use normalize::PixelFormat;
pub use raw::{RawStreamConfig, RawStreamSource};
pub use synthetic::{SyntheticConfig, SyntheticSource};
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::{V4l2Config, V4l2Source};

/// A live or recorded feed of frames.
pub trait FrameSource {
    /// Open the underlying device or file. Must be called before `next_frame`.
    fn connect(&mut self) -> Result<()>;

    /// Next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Check if the source is healthy.
    fn is_healthy(&self) -> bool;

    /// Get frame statistics.
    fn stats(&self) -> SourceStats;
}

/// Statistics for a frame source.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub url: String,
}

/// Build the source named by `settings.url` for `width` x `height` frames.
pub fn open_source(
    settings: &SourceSettings,
    width: u32,
    height: u32,
) -> Result<Box<dyn FrameSource>> {
    let url = settings.url.trim();
    if url.starts_with("stub://") {
        let config = SyntheticConfig::from_url(url, width, height)?;
        return Ok(Box::new(SyntheticSource::new(config)));
    }
    if let Some(path) = url.strip_prefix("raw:") {
        let config = RawStreamConfig {
            path: path.to_string(),
            width,
            height,
            format: settings.pixel_format,
        };
        return Ok(Box::new(RawStreamSource::new(config)?));
    }
    if let Some(dir) = url.strip_prefix("images:") {
        let config = ImageSequenceConfig {
            dir: dir.into(),
            width,
            height,
        };
        return Ok(Box::new(ImageSequenceSource::new(config)?));
    }
    if url.starts_with("/dev/video") {
        return open_v4l2(url, settings, width, height);
    }
    Err(anyhow!(
        "unsupported frame source '{}' (expected stub://, raw:, images: or /dev/videoN)",
        url
    ))
}

#[cfg(feature = "ingest-v4l2")]
fn open_v4l2(
    device: &str,
    settings: &SourceSettings,
    width: u32,
    height: u32,
) -> Result<Box<dyn FrameSource>> {
    let config = V4l2Config {
        device: device.to_string(),
        target_fps: settings.target_fps,
        width,
        height,
    };
    Ok(Box::new(V4l2Source::new(config)?))
}

#[cfg(not(feature = "ingest-v4l2"))]
fn open_v4l2(
    device: &str,
    _settings: &SourceSettings,
    _width: u32,
    _height: u32,
) -> Result<Box<dyn FrameSource>> {
    Err(anyhow!(
        "capture from {} requires the ingest-v4l2 feature",
        device
    ))
}
