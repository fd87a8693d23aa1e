//! Color segmentation: threshold in HSV, then a morphological opening.

use crate::frame::{Frame, CHANNELS};

use super::color::{rgb_to_hsv, ColorRange};
use super::mask::Mask;

/// Passes of erosion (and then dilation) applied by default.
pub const DEFAULT_MORPH_ITERATIONS: u32 = 2;

/// Produces a denoised binary mask of the pixels inside a color range.
///
/// Owns a scratch mask so repeated calls on same-sized frames do not allocate.
pub struct ColorSegmenter {
    range: ColorRange,
    iterations: u32,
    scratch: Mask,
}

impl ColorSegmenter {
    pub fn new(range: ColorRange, iterations: u32) -> Self {
        Self {
            range,
            iterations,
            scratch: Mask::empty(),
        }
    }

    pub fn range(&self) -> &ColorRange {
        &self.range
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Segment `frame` into `mask`, resizing `mask` to the frame's dimensions.
    pub fn segment(&mut self, frame: &Frame, mask: &mut Mask) {
        threshold(frame, &self.range, mask);
        for _ in 0..self.iterations {
            erode(mask, &mut self.scratch);
            std::mem::swap(mask, &mut self.scratch);
        }
        for _ in 0..self.iterations {
            dilate(mask, &mut self.scratch);
            std::mem::swap(mask, &mut self.scratch);
        }
    }
}

/// Mark every pixel whose HSV value lies inside `range`.
pub fn threshold(frame: &Frame, range: &ColorRange, mask: &mut Mask) {
    mask.reset(frame.width, frame.height);
    let out = mask.as_mut_slice();
    for (dst, px) in out.iter_mut().zip(frame.as_rgb().chunks_exact(CHANNELS)) {
        let hsv = rgb_to_hsv([px[0], px[1], px[2]]);
        *dst = u8::from(range.contains(hsv));
    }
}

/// 3x3 erosion. Pixels outside the image count as set, so the border does not erode.
pub fn erode(src: &Mask, dst: &mut Mask) {
    morph(src, dst, true);
}

/// 3x3 dilation. Pixels outside the image count as clear, so the border does not grow.
pub fn dilate(src: &Mask, dst: &mut Mask) {
    morph(src, dst, false);
}

fn morph(src: &Mask, dst: &mut Mask, erode: bool) {
    dst.reset(src.width(), src.height());
    let (w, h) = (src.width() as usize, src.height() as usize);
    let input = src.as_slice();
    let output = dst.as_mut_slice();

    // Restricting the window to in-bounds pixels is the same as padding with
    // the neutral element of the operation.
    for y in 0..h {
        let (y0, y1) = (y.saturating_sub(1), (y + 1).min(h - 1));
        for x in 0..w {
            let (x0, x1) = (x.saturating_sub(1), (x + 1).min(w - 1));
            let hit = if erode {
                (y0..=y1).all(|ny| input[ny * w + x0..=ny * w + x1].iter().all(|&v| v != 0))
            } else {
                (y0..=y1).any(|ny| input[ny * w + x0..=ny * w + x1].iter().any(|&v| v != 0))
            };
            output[y * w + x] = u8::from(hit);
        }
    }
}
