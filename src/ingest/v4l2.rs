//! V4L2 frame source.
//!
//! Captures from a local device node (e.g., /dev/video0). The device is asked
//! for RGB24 at the configured size; NV12 and BGR24 are accepted as fallbacks
//! and converted to RGB24 before handoff.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;
use std::time::{Duration, Instant};

use super::normalize::{normalize_to_rgb, PixelFormat};
use super::{FrameSource, SourceStats};
use crate::frame::Frame;

/// Configuration for a V4L2 source.
#[derive(Clone, Debug)]
pub struct V4l2Config {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Requested frame rate. 0 leaves the device default.
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

pub struct V4l2Source {
    config: V4l2Config,
    state: Option<DeviceState>,
    format: PixelFormat,
    frame_count: u64,
    last_frame_at: Option<Instant>,
    last_error: Option<String>,
}

#[self_referencing]
struct DeviceState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

fn pixel_format_for(fourcc: v4l::FourCC) -> Option<PixelFormat> {
    match &fourcc.repr {
        b"RGB3" => Some(PixelFormat::Rgb24),
        b"BGR3" => Some(PixelFormat::Bgr24),
        b"NV12" => Some(PixelFormat::Nv12),
        _ => None,
    }
}

impl V4l2Source {
    pub fn new(config: V4l2Config) -> Result<Self> {
        Ok(Self {
            config,
            state: None,
            format: PixelFormat::Rgb24,
            frame_count: 0,
            last_frame_at: None,
            last_error: None,
        })
    }

    fn health_grace(&self) -> Duration {
        let base_ms = if self.config.target_fps == 0 {
            2_000
        } else {
            (1000 / self.config.target_fps).saturating_mul(6)
        };
        Duration::from_millis(base_ms.max(2_000) as u64)
    }
}

impl FrameSource for V4l2Source {
    fn connect(&mut self) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&self.config.device)
            .with_context(|| format!("open v4l2 device {}", self.config.device))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = self.config.width;
        format.height = self.config.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "V4l2Source: failed to set format on {}: {}",
                    self.config.device,
                    err
                );
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };

        self.format = pixel_format_for(format.fourcc).ok_or_else(|| {
            anyhow!(
                "{} delivers {}, expected RGB3, BGR3 or NV12",
                self.config.device,
                format.fourcc
            )
        })?;
        if (format.width, format.height) != (self.config.width, self.config.height) {
            return Err(anyhow!(
                "{} negotiated {}x{}, configured frame is {}x{}",
                self.config.device,
                format.width,
                format.height,
                self.config.width,
                self.config.height
            ));
        }

        if self.config.target_fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(self.config.target_fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!(
                    "V4l2Source: failed to set fps on {}: {}",
                    self.config.device,
                    err
                );
            }
        }

        self.last_error = None;
        let state = DeviceStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()
        .map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;
        self.state = Some(state);

        log::info!(
            "V4l2Source: connected to {} ({}x{} {})",
            self.config.device,
            self.config.width,
            self.config.height,
            self.format
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        use v4l::io::traits::CaptureStream;

        let state = self.state.as_mut().context("v4l2 device not connected")?;
        let payload = state
            .with_mut(|fields| {
                fields.stream.next().map(|(buf, meta)| {
                    // Drivers may pad the mapped buffer; only `bytesused` is payload.
                    let used = (meta.bytesused as usize).min(buf.len());
                    buf[..used].to_vec()
                })
            })
            .map_err(|err| {
                self.last_error = Some(err.to_string());
                anyhow::Error::new(err).context("capture v4l2 frame")
            })?;

        let (width, height) = (self.config.width, self.config.height);
        let expected = self.format.frame_len(width, height)?;
        let payload = payload.get(..expected).unwrap_or(&payload[..]);
        let rgb = normalize_to_rgb(payload, width, height, self.format).map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;

        self.frame_count += 1;
        self.last_frame_at = Some(Instant::now());
        Ok(Some(Frame::new(rgb, width, height)?.with_seq(self.frame_count)))
    }

    fn is_healthy(&self) -> bool {
        if self.last_error.is_some() {
            return false;
        }
        let Some(last_frame_at) = self.last_frame_at else {
            return true;
        };
        last_frame_at.elapsed() <= self.health_grace()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            url: self.config.device.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_fourccs() {
        assert_eq!(
            pixel_format_for(v4l::FourCC::new(b"RGB3")),
            Some(PixelFormat::Rgb24)
        );
        assert_eq!(
            pixel_format_for(v4l::FourCC::new(b"NV12")),
            Some(PixelFormat::Nv12)
        );
        assert_eq!(pixel_format_for(v4l::FourCC::new(b"YUYV")), None);
    }

    #[test]
    fn missing_device_fails_on_connect() -> Result<()> {
        let mut source = V4l2Source::new(V4l2Config {
            device: "/dev/video-does-not-exist".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
        })?;
        assert!(source.connect().is_err());
        assert!(source.next_frame().is_err());
        Ok(())
    }
}
