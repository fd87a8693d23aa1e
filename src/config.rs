use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::detect::{ColorBlobConfig, ColorRange};
use crate::ingest::PixelFormat;
use crate::zone::{Thresholds, Zone};

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;
const DEFAULT_SOURCE_URL: &str = "stub://demo";
const DEFAULT_TARGET_FPS: u32 = 30;
const DEFAULT_ZONE: [i32; 4] = [900, 150, 1200, 600];
const DEFAULT_THRESHOLD_DANGER: f64 = 25.0;
const DEFAULT_THRESHOLD_WARNING: f64 = 75.0;

#[derive(Debug, Deserialize, Default)]
struct MonitorConfigFile {
    frame: Option<FrameConfigFile>,
    source: Option<SourceConfigFile>,
    color: Option<ColorConfigFile>,
    zone: Option<ZoneConfigFile>,
    thresholds: Option<ThresholdsConfigFile>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct FrameConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    mirror: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    url: Option<String>,
    pixel_format: Option<String>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ColorConfigFile {
    lower: Option<[u8; 3]>,
    upper: Option<[u8; 3]>,
}

#[derive(Debug, Deserialize, Default)]
struct ZoneConfigFile {
    rect: Option<[i32; 4]>,
}

#[derive(Debug, Deserialize, Default)]
struct ThresholdsConfigFile {
    danger: Option<f64>,
    warning: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    min_area: Option<u64>,
    morph_iterations: Option<u32>,
}

/// Session configuration, fixed once loaded.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub frame: FrameSettings,
    pub source: SourceSettings,
    pub zone: Zone,
    pub thresholds: Thresholds,
    pub detector: ColorBlobConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSettings {
    pub width: u32,
    pub height: u32,
    /// Flip frames left-to-right before detection.
    pub mirror: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub url: String,
    pub pixel_format: PixelFormat,
    /// Loop pacing; 0 runs as fast as the source delivers.
    pub target_fps: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mirror: true,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            pixel_format: PixelFormat::default(),
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

impl MonitorConfig {
    /// Load from the file named by `PROXIMITY_CONFIG` (if set), then the environment.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PROXIMITY_CONFIG")
            .ok()
            .filter(|path| !path.trim().is_empty());
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MonitorConfigFile) -> Result<Self> {
        let defaults = FrameSettings::default();
        let frame = FrameSettings {
            width: file
                .frame
                .as_ref()
                .and_then(|frame| frame.width)
                .unwrap_or(defaults.width),
            height: file
                .frame
                .as_ref()
                .and_then(|frame| frame.height)
                .unwrap_or(defaults.height),
            mirror: file
                .frame
                .as_ref()
                .and_then(|frame| frame.mirror)
                .unwrap_or(defaults.mirror),
        };

        let defaults = SourceSettings::default();
        let source = SourceSettings {
            url: file
                .source
                .as_ref()
                .and_then(|source| source.url.clone())
                .unwrap_or(defaults.url),
            pixel_format: match file
                .source
                .as_ref()
                .and_then(|source| source.pixel_format.as_deref())
            {
                Some(name) => name.parse()?,
                None => defaults.pixel_format,
            },
            target_fps: file
                .source
                .as_ref()
                .and_then(|source| source.target_fps)
                .unwrap_or(defaults.target_fps),
        };

        let bright_red = ColorRange::bright_red();
        let range = ColorRange::new(
            file.color
                .as_ref()
                .and_then(|color| color.lower)
                .unwrap_or(bright_red.lower()),
            file.color
                .as_ref()
                .and_then(|color| color.upper)
                .unwrap_or(bright_red.upper()),
        )
        .map_err(|e| anyhow!("invalid color range: {}", e))?;

        let zone = Zone::from_rect(
            file.zone
                .and_then(|zone| zone.rect)
                .unwrap_or(DEFAULT_ZONE),
        )?;
        let thresholds = Thresholds::new(
            file.thresholds
                .as_ref()
                .and_then(|t| t.danger)
                .unwrap_or(DEFAULT_THRESHOLD_DANGER),
            file.thresholds
                .as_ref()
                .and_then(|t| t.warning)
                .unwrap_or(DEFAULT_THRESHOLD_WARNING),
        )?;

        let defaults = ColorBlobConfig::default();
        let detector = ColorBlobConfig {
            range,
            min_area: file
                .detector
                .as_ref()
                .and_then(|d| d.min_area)
                .unwrap_or(defaults.min_area),
            morph_iterations: file
                .detector
                .as_ref()
                .and_then(|d| d.morph_iterations)
                .unwrap_or(defaults.morph_iterations),
        };

        Ok(Self {
            frame,
            source,
            zone,
            thresholds,
            detector,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(url) = env_value("PROXIMITY_SOURCE") {
            self.source.url = url;
        }
        if let Some(zone) = env_value("PROXIMITY_ZONE") {
            self.zone = parse_zone(&zone)?;
        }
        let danger = env_value("PROXIMITY_THRESHOLD_DANGER")
            .map(|v| parse_f64("PROXIMITY_THRESHOLD_DANGER", &v))
            .transpose()?;
        let warning = env_value("PROXIMITY_THRESHOLD_WARNING")
            .map(|v| parse_f64("PROXIMITY_THRESHOLD_WARNING", &v))
            .transpose()?;
        if danger.is_some() || warning.is_some() {
            self.thresholds = Thresholds::new(
                danger.unwrap_or(self.thresholds.danger()),
                warning.unwrap_or(self.thresholds.warning()),
            )?;
        }
        if let Some(min_area) = env_value("PROXIMITY_MIN_AREA") {
            self.detector.min_area = min_area
                .parse()
                .map_err(|_| anyhow!("PROXIMITY_MIN_AREA must be a non-negative integer"))?;
        }
        if let Some(mirror) = env_value("PROXIMITY_MIRROR") {
            self.frame.mirror = parse_bool("PROXIMITY_MIRROR", &mirror)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(anyhow!(
                "frame dimensions must be non-zero ({}x{})",
                self.frame.width,
                self.frame.height
            ));
        }
        if !self.zone.fits_within(self.frame.width, self.frame.height) {
            let [x1, y1, x2, y2] = self.zone.as_rect();
            return Err(anyhow!(
                "zone ({}, {}, {}, {}) does not fit within a {}x{} frame",
                x1,
                y1,
                x2,
                y2,
                self.frame.width,
                self.frame.height
            ));
        }
        if self.source.url.trim().is_empty() {
            return Err(anyhow!("source url must not be empty"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<MonitorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn split_csv(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn parse_zone(value: &str) -> Result<Zone> {
    let parts = split_csv(value);
    let coords: Vec<i32> = parts
        .iter()
        .map(|part| part.parse::<i32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| anyhow!("PROXIMITY_ZONE must be four integers: x1,y1,x2,y2"))?;
    let rect: [i32; 4] = coords
        .try_into()
        .map_err(|_| anyhow!("PROXIMITY_ZONE must be four integers: x1,y1,x2,y2"))?;
    Zone::from_rect(rect)
}

fn parse_f64(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a number of pixels", name))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{} must be true or false", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_session() -> Result<()> {
        let cfg = MonitorConfig::from_file(MonitorConfigFile::default())?;
        assert_eq!(cfg.frame, FrameSettings::default());
        assert_eq!(cfg.zone.as_rect(), [900, 150, 1200, 600]);
        assert_eq!(cfg.thresholds.danger(), 25.0);
        assert_eq!(cfg.thresholds.warning(), 75.0);
        assert_eq!(cfg.detector, ColorBlobConfig::default());
        assert_eq!(cfg.source.pixel_format, PixelFormat::Rgb24);
        cfg.validate()
    }

    #[test]
    fn parses_zone_lists() -> Result<()> {
        assert_eq!(parse_zone(" 10, 20 ,30,40")?.as_rect(), [10, 20, 30, 40]);
        assert!(parse_zone("10,20,30").is_err());
        assert!(parse_zone("10,20,30,x").is_err());
        assert!(parse_zone("30,20,10,40").is_err());
        Ok(())
    }

    #[test]
    fn parses_booleans() -> Result<()> {
        assert!(parse_bool("X", "Yes")?);
        assert!(!parse_bool("X", "0")?);
        assert!(parse_bool("X", "maybe").is_err());
        Ok(())
    }

    #[test]
    fn rejects_zone_outside_frame() -> Result<()> {
        let mut cfg = MonitorConfig::from_file(MonitorConfigFile::default())?;
        cfg.frame.width = 640;
        cfg.frame.height = 480;
        assert!(cfg.validate().is_err());
        Ok(())
    }
}
