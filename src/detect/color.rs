//! HSV conversion and target color ranges.
//!
//! HSV uses the 8-bit convention common to video tooling: hue is degrees / 2
//! (0..=179), saturation and value are 0..=255.

use anyhow::{anyhow, Result};
use serde::Serialize;

/// Largest representable hue in the 8-bit convention.
pub const HUE_MAX: u8 = 179;

/// Inclusive HSV bounds. Hue does not wrap: `lower <= upper` on every channel.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ColorRange {
    lower: [u8; 3],
    upper: [u8; 3],
}

impl ColorRange {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Result<Self> {
        if lower[0] > HUE_MAX || upper[0] > HUE_MAX {
            return Err(anyhow!(
                "hue bounds must be within 0..={} (got {} and {})",
                HUE_MAX,
                lower[0],
                upper[0]
            ));
        }
        for (channel, name) in ["hue", "saturation", "value"].iter().enumerate() {
            if lower[channel] > upper[channel] {
                return Err(anyhow!(
                    "color range {} lower bound {} exceeds upper bound {}",
                    name,
                    lower[channel],
                    upper[channel]
                ));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Default target: saturated, bright red.
    pub fn bright_red() -> Self {
        Self {
            lower: [0, 100, 100],
            upper: [10, 255, 255],
        }
    }

    pub fn lower(&self) -> [u8; 3] {
        self.lower
    }

    pub fn upper(&self) -> [u8; 3] {
        self.upper
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    /// Convert an RGB pixel and test it against the range.
    pub fn matches_rgb(&self, rgb: [u8; 3]) -> bool {
        self.contains(rgb_to_hsv(rgb))
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self::bright_red()
    }
}

/// Convert RGB to 8-bit HSV (`h` in 0..=179).
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { 255.0 * delta / max };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };
    let h = ((h / 2.0).round() as u16 % 180) as u8;

    [h, s.round() as u8, max as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_primaries() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([255, 255, 0]), [30, 255, 255]);
    }

    #[test]
    fn converts_grays_and_black() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
    }

    #[test]
    fn hue_near_full_turn_stays_in_range() {
        // Magenta-leaning red: hue just below 360 degrees.
        let [h, _, _] = rgb_to_hsv([255, 0, 1]);
        assert!(h <= HUE_MAX);
    }

    #[test]
    fn bright_red_matches_red_objects_only() {
        let range = ColorRange::bright_red();
        assert!(range.matches_rgb([220, 30, 30]));
        assert!(range.matches_rgb([255, 40, 0]));
        assert!(!range.matches_rgb([30, 220, 30]));
        assert!(!range.matches_rgb([90, 70, 70]), "desaturated red must not match");
        assert!(!range.matches_rgb([60, 5, 5]), "dark red must not match");
    }

    #[test]
    fn rejects_inverted_or_out_of_range_bounds() {
        assert!(ColorRange::new([10, 100, 100], [0, 255, 255]).is_err());
        assert!(ColorRange::new([0, 200, 100], [10, 100, 255]).is_err());
        assert!(ColorRange::new([0, 0, 0], [180, 255, 255]).is_err());
        assert!(ColorRange::new([0, 0, 0], [179, 255, 255]).is_ok());
    }

    #[test]
    fn bounds_are_inclusive() -> Result<()> {
        let range = ColorRange::new([5, 10, 20], [6, 11, 21])?;
        assert!(range.contains([5, 10, 20]));
        assert!(range.contains([6, 11, 21]));
        assert!(!range.contains([7, 11, 21]));
        assert!(!range.contains([5, 9, 20]));
        Ok(())
    }
}
