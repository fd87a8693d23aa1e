//! Largest-region search over a binary mask.
//!
//! Regions are outer boundaries only: holes are filled, and anything nested
//! inside a hole belongs to the enclosing region. Foreground is 8-connected and
//! background 4-connected, so enclosure is unambiguous.

use super::mask::Mask;
use super::result::{Bounds, DetectionResult, Moments, Region};

/// Smallest accepted region, in pixels.
pub const DEFAULT_MIN_AREA: u64 = 1500;

const UNSEEN: u8 = 0;
const OUTSIDE: u8 = 1;
const CLAIMED: u8 = 2;

/// Finds the largest qualifying region and its centroid.
///
/// Scratch buffers are kept between calls and reused for same-sized masks.
pub struct ObjectLocator {
    min_area: u64,
    marks: Vec<u8>,
    stack: Vec<usize>,
}

impl ObjectLocator {
    pub fn new(min_area: u64) -> Self {
        Self {
            min_area,
            marks: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn min_area(&self) -> u64 {
        self.min_area
    }

    /// Scan `mask` and select the largest region.
    ///
    /// Equal areas resolve to the region whose first pixel comes first in
    /// row-major order. A largest area below `min_area` yields no target.
    pub fn locate(&mut self, mask: &Mask) -> DetectionResult {
        let (w, h) = (mask.width() as usize, mask.height() as usize);
        debug_assert!(w > 0 && h > 0, "locator requires a non-empty mask");
        self.marks.clear();
        self.marks.resize(w * h, UNSEEN);
        self.mark_outside(mask);

        let mut best: Option<Region> = None;
        let mut regions_seen = 0;
        for seed in 0..w * h {
            if self.marks[seed] != UNSEEN {
                continue;
            }
            let Some(region) = self.claim(seed, w, h) else {
                continue;
            };
            regions_seen += 1;
            if best.as_ref().map_or(true, |b| region.area > b.area) {
                best = Some(region);
            }
        }

        let largest_area = best.as_ref().map_or(0, |r| r.area);
        DetectionResult {
            target: best.filter(|r| r.area >= self.min_area),
            regions_seen,
            largest_area,
        }
    }

    /// Flood the background reachable from the image border (4-connected).
    fn mark_outside(&mut self, mask: &Mask) {
        let (w, h) = (mask.width() as usize, mask.height() as usize);
        let fg = mask.as_slice();
        self.stack.clear();

        let border = (0..w)
            .flat_map(|x| [x, (h - 1) * w + x])
            .chain((0..h).flat_map(|y| [y * w, y * w + w - 1]));
        for i in border {
            if fg[i] == 0 && self.marks[i] == UNSEEN {
                self.marks[i] = OUTSIDE;
                self.stack.push(i);
            }
        }

        while let Some(i) = self.stack.pop() {
            let (x, y) = (i % w, i / w);
            let mut visit = |j: usize| {
                if fg[j] == 0 && self.marks[j] == UNSEEN {
                    self.marks[j] = OUTSIDE;
                    self.stack.push(j);
                }
            };
            if x > 0 {
                visit(i - 1);
            }
            if x + 1 < w {
                visit(i + 1);
            }
            if y > 0 {
                visit(i - w);
            }
            if y + 1 < h {
                visit(i + w);
            }
        }
    }

    /// Claim the solid (foreground plus enclosed holes) component containing `seed`.
    fn claim(&mut self, seed: usize, w: usize, h: usize) -> Option<Region> {
        let mut moments = Moments::default();
        let mut bounds = Bounds::at(seed % w, seed / w);

        self.marks[seed] = CLAIMED;
        self.stack.clear();
        self.stack.push(seed);
        while let Some(i) = self.stack.pop() {
            let (x, y) = (i % w, i / w);
            moments.add(x, y);
            bounds.include(x, y);

            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let j = ny * w + nx;
                    if self.marks[j] == UNSEEN {
                        self.marks[j] = CLAIMED;
                        self.stack.push(j);
                    }
                }
            }
        }

        let centroid = moments.centroid()?;
        Some(Region {
            area: moments.m00 as u64,
            centroid,
            bounds,
            moments,
        })
    }
}
