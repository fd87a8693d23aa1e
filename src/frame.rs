//! Frame container.
//!
//! - `Frame`: packed RGB24 pixels, row-major, with dimensions fixed at construction.
//!
//! Construction validates dimensions, so a zero-sized or truncated frame cannot
//! reach the detection pipeline.

use anyhow::{anyhow, Result};
use image::RgbImage;

/// Bytes per packed RGB24 pixel.
pub const CHANNELS: usize = 3;

/// One captured video frame.
pub struct Frame {
    data: Vec<u8>,

    pub width: u32,
    pub height: u32,

    /// Source-assigned sequence number, monotonically increasing per session.
    pub seq: u64,
}

impl Frame {
    /// Wrap packed RGB24 pixels. Fails on zero dimensions or a length mismatch.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = expected_len(width, height)?;
        if data.len() != expected {
            return Err(anyhow!(
                "frame length mismatch for {}x{}: expected {}, got {}",
                width,
                height,
                expected,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            seq: 0,
        })
    }

    /// Solid-color frame.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        let len = expected_len(width, height)?;
        let data = rgb.iter().copied().cycle().take(len).collect();
        Self::new(data, width, height)
    }

    pub fn from_rgb_image(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    /// Packed RGB24 bytes, row-major.
    pub fn as_rgb(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let offset = self.offset(x, y)?;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }

    /// Write one pixel. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: i64, y: i64, rgb: [u8; 3]) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(offset) = self.offset(x as u32, y as u32) {
            self.data[offset..offset + CHANNELS].copy_from_slice(&rgb);
        }
    }

    /// Flip left-to-right in place, so the view acts like a mirror.
    pub fn mirror_horizontal(&mut self) {
        let row_len = self.width as usize * CHANNELS;
        for row in self.data.chunks_exact_mut(row_len) {
            let w = self.width as usize;
            for i in 0..w / 2 {
                let (a, b) = (i * CHANNELS, (w - 1 - i) * CHANNELS);
                for c in 0..CHANNELS {
                    row.swap(a + c, b + c);
                }
            }
        }
    }

    /// Copy into an `image` buffer for encoding.
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", self.width, self.height))
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

fn expected_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(anyhow!("frame dimensions must be non-zero ({}x{})", width, height));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| anyhow!("frame dimensions overflow ({}x{})", width, height))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sized_frames() {
        assert!(Frame::new(vec![], 0, 10).is_err());
        assert!(Frame::new(vec![], 10, 0).is_err());
        assert!(Frame::filled(0, 0, [0, 0, 0]).is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(Frame::new(vec![0; 11], 2, 2).is_err());
        assert!(Frame::new(vec![0; 12], 2, 2).is_ok());
    }

    #[test]
    fn pixel_access_is_row_major() -> Result<()> {
        let data: Vec<u8> = (0..18).collect();
        let frame = Frame::new(data, 3, 2)?;
        assert_eq!(frame.pixel(0, 0), Some([0, 1, 2]));
        assert_eq!(frame.pixel(2, 0), Some([6, 7, 8]));
        assert_eq!(frame.pixel(0, 1), Some([9, 10, 11]));
        assert_eq!(frame.pixel(3, 0), None);
        Ok(())
    }

    #[test]
    fn put_pixel_clips_out_of_bounds() -> Result<()> {
        let mut frame = Frame::filled(2, 2, [0, 0, 0])?;
        frame.put_pixel(-1, 0, [9, 9, 9]);
        frame.put_pixel(2, 1, [9, 9, 9]);
        frame.put_pixel(1, 1, [1, 2, 3]);
        assert_eq!(frame.pixel(1, 1), Some([1, 2, 3]));
        assert!(frame.as_rgb()[..9].iter().all(|&b| b == 0));
        Ok(())
    }

    #[test]
    fn mirror_flips_each_row() -> Result<()> {
        let data: Vec<u8> = (0..18).collect();
        let mut frame = Frame::new(data, 3, 2)?;
        frame.mirror_horizontal();
        assert_eq!(frame.pixel(0, 0), Some([6, 7, 8]));
        assert_eq!(frame.pixel(1, 0), Some([3, 4, 5]));
        assert_eq!(frame.pixel(2, 1), Some([9, 10, 11]));
        Ok(())
    }

    #[test]
    fn converts_to_image_buffer() -> Result<()> {
        let frame = Frame::filled(4, 3, [10, 20, 30])?;
        let image = frame.to_rgb_image()?;
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(3, 2).0, [10, 20, 30]);
        let back = Frame::from_rgb_image(image)?;
        assert_eq!(back.as_rgb(), frame.as_rgb());
        Ok(())
    }
}
