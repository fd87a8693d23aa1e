//! Per-frame perception-to-decision pipeline.
//!
//! Detector backend → tracked point → zone classification. Each call to
//! `process` is independent; the only state kept between frames is the
//! backend's scratch buffers.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::detect::{DetectionResult, DetectorBackend, Region};
use crate::frame::Frame;
use crate::zone::{classify, Point, SafetyState, Thresholds, Zone};

/// Everything decided about one frame.
#[derive(Clone, Debug, Serialize)]
pub struct FrameOutcome {
    pub seq: u64,
    pub state: SafetyState,
    pub point: Option<Point>,
    /// Distance to the zone in pixels; `None` when nothing was tracked.
    pub distance: Option<f64>,
    /// Area of the tracked region.
    pub area: Option<u64>,
    #[serde(skip)]
    pub region: Option<Region>,
    #[serde(skip)]
    pub regions_seen: usize,
}

pub struct MonitorPipeline<B: DetectorBackend> {
    backend: B,
    zone: Zone,
    thresholds: Thresholds,
}

impl<B: DetectorBackend> MonitorPipeline<B> {
    pub fn new(backend: B, zone: Zone, thresholds: Thresholds) -> Self {
        Self {
            backend,
            zone,
            thresholds,
        }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn warm_up(&mut self, width: u32, height: u32) -> Result<()> {
        self.backend.warm_up(width, height)
    }

    /// Segment, locate and classify one frame.
    pub fn process(&mut self, frame: &Frame) -> Result<FrameOutcome> {
        let detection = self.backend.detect(frame)?;
        Ok(self.decide(frame.seq, detection))
    }

    fn decide(&self, seq: u64, detection: DetectionResult) -> FrameOutcome {
        let point = detection.point();
        let proximity = classify(point, &self.zone, &self.thresholds);
        log::debug!(
            "frame {}: {} region(s), largest area {}, point={:?}, state={}",
            seq,
            detection.regions_seen,
            detection.largest_area,
            point,
            proximity.state
        );
        FrameOutcome {
            seq,
            state: proximity.state,
            point,
            distance: proximity.distance,
            area: detection.target.as_ref().map(|r| r.area),
            region: detection.target,
            regions_seen: detection.regions_seen,
        }
    }
}

/// Write `outcome` to `out` as a single JSON line and flush.
pub fn write_json_line(out: &mut impl Write, outcome: &FrameOutcome) -> Result<()> {
    serde_json::to_writer(&mut *out, outcome)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ScriptedBackend;

    fn pipeline(points: Vec<Option<Point>>) -> Result<MonitorPipeline<ScriptedBackend>> {
        Ok(MonitorPipeline::new(
            ScriptedBackend::new(points),
            Zone::new(900, 150, 1200, 600)?,
            Thresholds::new(25.0, 75.0)?,
        ))
    }

    #[test]
    fn classifies_each_frame_independently() -> Result<()> {
        let mut p = pipeline(vec![
            Some(Point::new(1300, 375)),
            Some(Point::new(1200, 375)),
            None,
            Some(Point::new(1230, 375)),
        ])?;
        let frame = Frame::filled(8, 8, [0, 0, 0])?;

        let states: Vec<_> = (0..4)
            .map(|_| p.process(&frame).map(|o| o.state))
            .collect::<Result<_>>()?;
        assert_eq!(
            states,
            vec![
                SafetyState::Safe,
                SafetyState::Danger,
                SafetyState::Safe,
                SafetyState::Warning
            ]
        );
        Ok(())
    }

    #[test]
    fn outcome_reports_distance_and_area() -> Result<()> {
        let mut p = pipeline(vec![Some(Point::new(1230, 375)), None])?;
        let frame = Frame::filled(8, 8, [0, 0, 0])?.with_seq(7);

        let hit = p.process(&frame)?;
        assert_eq!(hit.seq, 7);
        assert_eq!(hit.distance, Some(30.0));
        assert_eq!(hit.area, Some(2_000));

        let miss = p.process(&frame)?;
        assert_eq!(miss.point, None);
        assert_eq!(miss.distance, None);
        assert_eq!(miss.area, None);
        Ok(())
    }

    #[test]
    fn outcome_serializes_without_region_details() -> Result<()> {
        let mut p = pipeline(vec![Some(Point::new(1200, 375))])?;
        let frame = Frame::filled(8, 8, [0, 0, 0])?;
        let json = serde_json::to_value(p.process(&frame)?)?;
        assert_eq!(json["state"], "DANGER");
        assert_eq!(json["point"]["x"], 1200);
        assert_eq!(json["distance"], 0.0);
        assert!(json.get("region").is_none());
        Ok(())
    }

    #[test]
    fn json_lines_are_newline_terminated() -> Result<()> {
        let mut p = pipeline(vec![Some(Point::new(1230, 375)), None])?;
        let frame = Frame::filled(8, 8, [0, 0, 0])?.with_seq(3);
        let mut out = Vec::new();
        write_json_line(&mut out, &p.process(&frame)?)?;
        write_json_line(&mut out, &p.process(&frame)?)?;

        let text = String::from_utf8(out)?;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        let first: serde_json::Value = serde_json::from_str(lines[0])?;
        assert_eq!(first["seq"], 3);
        assert_eq!(first["state"], "WARNING");
        let second: serde_json::Value = serde_json::from_str(lines[1])?;
        assert_eq!(second["state"], "SAFE");
        assert!(second["point"].is_null());
        Ok(())
    }
}
