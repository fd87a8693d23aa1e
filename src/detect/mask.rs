use anyhow::{anyhow, Result};

/// Binary image, one byte per pixel (0 or 1), row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("mask dimensions must be non-zero ({}x{})", width, height));
        }
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        })
    }

    /// Zero-sized placeholder for buffers that are `reset` before first use.
    pub(crate) fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Result<Self> {
        let mut mask = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                mask.set(x, y, f(x, y));
            }
        }
        Ok(mask)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[self.index(x, y)] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.data[i] = u8::from(on);
        }
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Resize to `width` x `height` and clear. Keeps the allocation when it is large enough.
    pub(crate) fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width as usize * height as usize, 0);
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_mask() {
        assert!(Mask::new(0, 4).is_err());
    }

    #[test]
    fn from_fn_sets_expected_pixels() -> Result<()> {
        let mask = Mask::from_fn(4, 3, |x, y| x == y)?;
        assert_eq!(mask.count(), 3);
        assert!(mask.get(2, 2));
        assert!(!mask.get(3, 2));
        assert!(!mask.get(9, 9));
        Ok(())
    }

    #[test]
    fn reset_clears_and_resizes() -> Result<()> {
        let mut mask = Mask::from_fn(4, 4, |_, _| true)?;
        mask.reset(2, 3);
        assert_eq!((mask.width(), mask.height()), (2, 3));
        assert_eq!(mask.count(), 0);
        Ok(())
    }
}
