//! Danger zone geometry and safety classification.
//!
//! Classification is a pure function of the current tracked point: there is no
//! memory of earlier frames and no hysteresis. A point sitting exactly on a
//! threshold may flip state every frame.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer pixel coordinate in frame space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// -------------------- Zone --------------------

/// Axis-aligned hazard rectangle. Inclusive on all four edges.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Zone {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Zone {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self> {
        if x1 >= x2 || y1 >= y2 {
            return Err(anyhow!(
                "zone must satisfy x1 < x2 and y1 < y2 (got {}, {}, {}, {})",
                x1,
                y1,
                x2,
                y2
            ));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn from_rect(rect: [i32; 4]) -> Result<Self> {
        Self::new(rect[0], rect[1], rect[2], rect[3])
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn as_rect(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.x1..=self.x2).contains(&point.x) && (self.y1..=self.y2).contains(&point.y)
    }

    /// Euclidean distance from `point` to the nearest point of the rectangle.
    ///
    /// Zero when the point lies inside or on the boundary. Outside a corner this
    /// is the distance to that corner.
    pub fn distance_to(&self, point: Point) -> f64 {
        let dx = axis_offset(point.x, self.x1, self.x2);
        let dy = axis_offset(point.y, self.y1, self.y2);
        (dx * dx + dy * dy).sqrt()
    }

    /// True when the whole rectangle lies inside a `width` x `height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x1 >= 0
            && self.y1 >= 0
            && i64::from(self.x2) < i64::from(width)
            && i64::from(self.y2) < i64::from(height)
    }
}

fn axis_offset(p: i32, lo: i32, hi: i32) -> f64 {
    let (p, lo, hi) = (i64::from(p), i64::from(lo), i64::from(hi));
    (lo - p).max(p - hi).max(0) as f64
}

// -------------------- Thresholds --------------------

/// Distance cut-offs in pixels. `danger <= warning`, both non-negative.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    danger: f64,
    warning: f64,
}

impl Thresholds {
    pub fn new(danger: f64, warning: f64) -> Result<Self> {
        if !danger.is_finite() || !warning.is_finite() {
            return Err(anyhow!("thresholds must be finite"));
        }
        if danger < 0.0 || warning < 0.0 {
            return Err(anyhow!(
                "thresholds must be non-negative (danger={}, warning={})",
                danger,
                warning
            ));
        }
        if danger > warning {
            return Err(anyhow!(
                "danger threshold {} exceeds warning threshold {}",
                danger,
                warning
            ));
        }
        Ok(Self { danger, warning })
    }

    pub fn danger(&self) -> f64 {
        self.danger
    }

    pub fn warning(&self) -> f64 {
        self.warning
    }

    /// Map a distance to a state. Ties resolve to the more severe state.
    pub fn state_for(&self, distance: f64) -> SafetyState {
        if distance <= self.danger {
            SafetyState::Danger
        } else if distance <= self.warning {
            SafetyState::Warning
        } else {
            SafetyState::Safe
        }
    }
}

// -------------------- Safety State --------------------

/// Ordered by severity: `Safe < Warning < Danger`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyState {
    #[default]
    Safe,
    Warning,
    Danger,
}

impl SafetyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyState::Safe => "SAFE",
            SafetyState::Warning => "WARNING",
            SafetyState::Danger => "DANGER",
        }
    }
}

impl fmt::Display for SafetyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output for one frame.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Proximity {
    pub state: SafetyState,
    /// `None` when no object was tracked.
    pub distance: Option<f64>,
}

/// Classify a tracked point against the zone.
///
/// An absent point is SAFE: an object that cannot be tracked is not treated as a hazard.
pub fn classify(point: Option<Point>, zone: &Zone, thresholds: &Thresholds) -> Proximity {
    match point {
        Some(point) => {
            let distance = zone.distance_to(point);
            Proximity {
                state: thresholds.state_for(distance),
                distance: Some(distance),
            }
        }
        None => Proximity {
            state: SafetyState::Safe,
            distance: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> Zone {
        Zone::new(900, 150, 1200, 600).unwrap()
    }

    fn thresholds() -> Thresholds {
        Thresholds::new(25.0, 75.0).unwrap()
    }

    #[test]
    fn rejects_degenerate_zone() {
        assert!(Zone::new(10, 10, 10, 20).is_err());
        assert!(Zone::new(10, 30, 20, 20).is_err());
        assert!(Zone::new(0, 0, 1, 1).is_ok());
    }

    #[test]
    fn rejects_bad_thresholds() {
        assert!(Thresholds::new(-1.0, 10.0).is_err());
        assert!(Thresholds::new(50.0, 10.0).is_err());
        assert!(Thresholds::new(f64::NAN, 10.0).is_err());
        assert!(Thresholds::new(10.0, 10.0).is_ok());
    }

    #[test]
    fn inside_points_are_zero_distance_and_danger() {
        let z = zone();
        for (x, y) in [(901, 151), (1050, 375), (1199, 599)] {
            let p = Point::new(x, y);
            assert!(z.contains(p));
            assert_eq!(z.distance_to(p), 0.0);
            assert_eq!(classify(Some(p), &z, &thresholds()).state, SafetyState::Danger);
        }
        for (x, y) in [(900, 150), (1200, 600), (900, 600), (1050, 150)] {
            let edge = Point::new(x, y);
            assert!(z.contains(edge));
            assert_eq!(z.distance_to(edge), 0.0);
        }
        assert!(!z.contains(Point::new(899, 375)));
        assert!(!z.contains(Point::new(1050, 601)));
        let zero = Thresholds::new(0.0, 0.0).unwrap();
        assert_eq!(
            classify(Some(Point::new(1000, 300)), &z, &zero).state,
            SafetyState::Danger
        );
    }

    #[test]
    fn horizontal_offset_is_exact() {
        let z = zone();
        let mid_y = (z.y1() + z.y2()) / 2;
        for d in [1, 7, 30, 400] {
            assert_eq!(z.distance_to(Point::new(z.x1() - d, mid_y)), d as f64);
        }
    }

    #[test]
    fn corner_offset_is_euclidean() {
        let z = zone();
        let (a, b) = (30, 40);
        let d = z.distance_to(Point::new(z.x1() - a, z.y1() - b));
        assert!((d - 50.0).abs() < 1e-9);
        let d = z.distance_to(Point::new(z.x2() + 5, z.y2() + 12));
        assert!((d - 13.0).abs() < 1e-9);
    }

    #[test]
    fn absent_point_is_safe() {
        let p = classify(None, &zone(), &Thresholds::new(1e9, 1e9).unwrap());
        assert_eq!(p.state, SafetyState::Safe);
        assert_eq!(p.distance, None);
    }

    #[test]
    fn reference_scenario() {
        let z = zone();
        let t = thresholds();
        let cases = [
            ((1200, 375), 0.0, SafetyState::Danger),
            ((1230, 375), 30.0, SafetyState::Warning),
            ((1300, 375), 100.0, SafetyState::Safe),
        ];
        for ((x, y), distance, state) in cases {
            let p = classify(Some(Point::new(x, y)), &z, &t);
            assert_eq!(p.distance, Some(distance));
            assert_eq!(p.state, state);
        }
    }

    #[test]
    fn threshold_ties_resolve_to_more_severe() {
        let t = thresholds();
        assert_eq!(t.state_for(25.0), SafetyState::Danger);
        assert_eq!(t.state_for(25.0001), SafetyState::Warning);
        assert_eq!(t.state_for(75.0), SafetyState::Warning);
        assert_eq!(t.state_for(75.0001), SafetyState::Safe);
    }

    #[test]
    fn severity_never_increases_with_distance() {
        let z = zone();
        let t = thresholds();
        let mut last = SafetyState::Danger;
        for x in 1200..1400 {
            let state = classify(Some(Point::new(x, 375)), &z, &t).state;
            assert!(state <= last, "state rose from {} to {} at x={}", last, state, x);
            last = state;
        }
    }

    #[test]
    fn classification_is_repeatable() {
        let z = zone();
        let t = thresholds();
        let p = Some(Point::new(1240, 120));
        let first = classify(p, &z, &t);
        for _ in 0..10 {
            assert_eq!(classify(p, &z, &t), first);
        }
    }

    #[test]
    fn fits_within_frame() {
        assert!(zone().fits_within(1280, 720));
        assert!(!zone().fits_within(1200, 720));
        assert!(!zone().fits_within(640, 480));
    }
}
