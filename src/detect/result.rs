use serde::Serialize;

use crate::zone::Point;

/// Output of one detection pass.
#[derive(Clone, Debug, Default)]
pub struct DetectionResult {
    /// Largest region, if it reached the minimum area.
    pub target: Option<Region>,
    /// Number of distinct regions found in the mask.
    pub regions_seen: usize,
    /// Area of the largest region, whether or not it qualified.
    pub largest_area: u64,
}

impl DetectionResult {
    /// Tracked point: the target's centroid.
    pub fn point(&self) -> Option<Point> {
        self.target.as_ref().map(|r| r.centroid)
    }
}

/// A connected foreground region with its holes filled.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Region {
    /// Pixel count.
    pub area: u64,
    pub centroid: Point,
    pub bounds: Bounds,
    #[serde(skip)]
    pub moments: Moments,
}

/// Inclusive pixel bounding box.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Bounds {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub(crate) fn at(x: usize, y: usize) -> Self {
        Self::new(x as u32, y as u32, x as u32, y as u32)
    }

    pub(crate) fn include(&mut self, x: usize, y: usize) {
        let (x, y) = (x as u32, y as u32);
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// Raw spatial moments of a region.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub(crate) fn add(&mut self, x: usize, y: usize) {
        self.m00 += 1.0;
        self.m10 += x as f64;
        self.m01 += y as f64;
    }

    /// `(M10/M00, M01/M00)` truncated to integers. `None` for an empty region.
    pub fn centroid(&self) -> Option<Point> {
        if self.m00 <= 0.0 {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as i32,
            (self.m01 / self.m00) as i32,
        ))
    }
}
