use anyhow::Result;
use std::collections::VecDeque;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{Bounds, DetectionResult, Moments, Region};
use crate::frame::Frame;
use crate::zone::Point;

/// Replays a fixed sequence of tracked points, ignoring frame content.
///
/// Once the script runs out every frame reports no object. Used for dry runs
/// and for exercising the classifier and annotator without real imagery.
pub struct ScriptedBackend {
    script: VecDeque<Option<Point>>,
    area: u64,
}

impl ScriptedBackend {
    pub fn new(points: impl IntoIterator<Item = Option<Point>>) -> Self {
        Self {
            script: points.into_iter().collect(),
            area: 2_000,
        }
    }

    /// Area reported for scripted regions.
    pub fn with_area(mut self, area: u64) -> Self {
        self.area = area.max(1);
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn region_at(&self, point: Point) -> Region {
        let (x, y) = (point.x.max(0) as u32, point.y.max(0) as u32);
        let area = self.area as f64;
        Region {
            area: self.area,
            centroid: point,
            bounds: Bounds::new(x, y, x, y),
            moments: Moments {
                m00: area,
                m10: area * f64::from(point.x),
                m01: area * f64::from(point.y),
            },
        }
    }
}

impl DetectorBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<DetectionResult> {
        let Some(point) = self.script.pop_front().flatten() else {
            return Ok(DetectionResult::default());
        };
        let region = self.region_at(point);
        Ok(DetectionResult {
            largest_area: region.area,
            regions_seen: 1,
            target: Some(region),
        })
    }
}
