//! Raw packed video source.
//!
//! Reads fixed-size frames of a known pixel format back to back from a file
//! or from stdin (`-`), e.g. the output of
//! `ffmpeg -i cam.mp4 -f rawvideo -pix_fmt rgb24 -`.
//!
//! End of input exactly on a frame boundary ends the stream. A partial frame
//! at end of input is an error.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{self, BufReader, Read};

use super::normalize::{normalize_to_rgb, PixelFormat};
use super::{FrameSource, SourceStats};
use crate::frame::Frame;

/// Configuration for a raw stream source.
#[derive(Clone, Debug)]
pub struct RawStreamConfig {
    /// File path, or "-" for stdin.
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

pub struct RawStreamSource {
    config: RawStreamConfig,
    reader: Option<Box<dyn Read>>,
    buf: Vec<u8>,
    frame_count: u64,
    last_error: Option<String>,
}

impl RawStreamSource {
    pub fn new(config: RawStreamConfig) -> Result<Self> {
        if config.path.is_empty() {
            return Err(anyhow!("raw source requires a path or '-' for stdin"));
        }
        let len = config.format.frame_len(config.width, config.height)?;
        Ok(Self {
            buf: vec![0u8; len],
            config,
            reader: None,
            frame_count: 0,
            last_error: None,
        })
    }

    /// Source over an already open reader. No `connect` needed.
    pub fn from_reader(reader: impl Read + 'static, config: RawStreamConfig) -> Result<Self> {
        let mut source = Self::new(config)?;
        source.reader = Some(Box::new(reader));
        Ok(source)
    }

    /// Fill the frame buffer. Returns the number of bytes read before EOF.
    fn fill(&mut self) -> Result<usize> {
        let reader = self.reader.as_mut().context("raw source not connected")?;
        let mut filled = 0;
        while filled < self.buf.len() {
            match reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.last_error = Some(err.to_string());
                    return Err(anyhow::Error::new(err).context("read raw frame"));
                }
            }
        }
        Ok(filled)
    }
}

impl FrameSource for RawStreamSource {
    fn connect(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        let reader: Box<dyn Read> = if self.config.path == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(&self.config.path)
                .with_context(|| format!("open raw stream {}", self.config.path))?;
            Box::new(BufReader::new(file))
        };
        self.reader = Some(reader);
        log::info!(
            "RawStreamSource: reading {} {}x{} from {}",
            self.config.format,
            self.config.width,
            self.config.height,
            self.config.path
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let filled = self.fill()?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < self.buf.len() {
            let msg = format!(
                "truncated frame: got {} of {} bytes",
                filled,
                self.buf.len()
            );
            self.last_error = Some(msg.clone());
            return Err(anyhow!(msg));
        }

        let rgb = normalize_to_rgb(
            &self.buf,
            self.config.width,
            self.config.height,
            self.config.format,
        )?;
        self.frame_count += 1;
        Ok(Some(
            Frame::new(rgb, self.config.width, self.config.height)?.with_seq(self.frame_count),
        ))
    }

    fn is_healthy(&self) -> bool {
        self.last_error.is_none()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            url: format!("raw:{}", self.config.path),
        }
    }
}
