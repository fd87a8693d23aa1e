//! Synthetic frame source.
//!
//! Renders a red disc sweeping left to right across the middle of the frame,
//! over a dark background. Sparse single-pixel red specks (on by default)
//! exercise the segmenter's noise removal. The sweep repeats every `period` frames.

use anyhow::{anyhow, Result};
use rand::Rng;
use std::str::FromStr;

use super::{FrameSource, SourceStats};
use crate::frame::Frame;

const BACKGROUND: [u8; 3] = [40, 40, 60];
const TARGET: [u8; 3] = [220, 30, 30];
const DEFAULT_NOISE_SPECKS: u32 = 20;

/// Configuration for a synthetic source.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Source URL, e.g. "stub://demo?frames=300&noise=20".
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Disc radius in pixels.
    pub radius: u32,
    /// Frames per full sweep.
    pub period: u32,
    /// End of stream after this many frames.
    pub frame_limit: Option<u64>,
    /// Random red specks per frame.
    pub noise_specks: u32,
}

impl SyntheticConfig {
    pub fn new(url: &str, width: u32, height: u32) -> Self {
        Self {
            url: url.to_string(),
            width,
            height,
            radius: 30,
            period: 120,
            frame_limit: None,
            noise_specks: DEFAULT_NOISE_SPECKS,
        }
    }

    /// Parse `stub://name?key=value&...`. Keys: frames, noise, radius, period.
    pub fn from_url(url: &str, width: u32, height: u32) -> Result<Self> {
        let rest = url
            .strip_prefix("stub://")
            .ok_or_else(|| anyhow!("synthetic source URL must start with stub://"))?;
        let mut config = Self::new(url, width, height);
        let Some((_, query)) = rest.split_once('?') else {
            return Ok(config);
        };
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("malformed stub parameter '{}'", pair))?;
            match key {
                "frames" => config.frame_limit = Some(parse_param(key, value)?),
                "noise" => config.noise_specks = parse_param(key, value)?,
                "radius" => config.radius = parse_param(key, value)?,
                "period" => config.period = parse_param::<u32>(key, value)?.max(1),
                other => return Err(anyhow!("unknown stub parameter '{}'", other)),
            }
        }
        Ok(config)
    }

    /// Disc center for zero-based frame `index`.
    pub fn disc_center(&self, index: u64) -> (i64, i64) {
        let margin = i64::from(self.radius) + 10;
        let span = (i64::from(self.width) - 2 * margin).max(1);
        let step = (span / i64::from(self.period)).max(1);
        let x = margin + (index as i64 * step) % span;
        (x, i64::from(self.height) / 2)
    }
}

fn parse_param<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        anyhow!(
            "stub parameter {} must be an integer in range, got '{}'",
            key,
            value
        )
    })
}

pub struct SyntheticSource {
    config: SyntheticConfig,
    frame_count: u64,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            frame_count: 0,
        }
    }

    fn render(&self, index: u64) -> Result<Frame> {
        let mut frame = Frame::filled(self.config.width, self.config.height, BACKGROUND)?;
        let (cx, cy) = self.config.disc_center(index);
        let r = i64::from(self.config.radius);
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                    frame.put_pixel(x, y, TARGET);
                }
            }
        }

        if self.config.noise_specks > 0 {
            let mut rng = rand::thread_rng();
            for _ in 0..self.config.noise_specks {
                let x = rng.gen_range(0..self.config.width);
                let y = rng.gen_range(0..self.config.height);
                frame.put_pixel(i64::from(x), i64::from(y), TARGET);
            }
        }
        Ok(frame)
    }
}

impl FrameSource for SyntheticSource {
    fn connect(&mut self) -> Result<()> {
        log::info!(
            "SyntheticSource: connected to {} ({}x{})",
            self.config.url,
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self
            .config
            .frame_limit
            .is_some_and(|limit| self.frame_count >= limit)
        {
            return Ok(None);
        }
        let frame = self.render(self.frame_count)?;
        self.frame_count += 1;
        Ok(Some(frame.with_seq(self.frame_count)))
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}
