//! Proximity Guard
//!
//! Real-time visual proximity monitor: tracks a colored object in a camera
//! feed and classifies how close it is to a fixed rectangular danger zone.
//!
//! # Pipeline
//!
//! Each frame passes through four stages, with no state carried between
//! frames other than reusable buffers:
//!
//! 1. **Segment**: HSV threshold plus a 3x3 morphological opening (`detect::segment`).
//! 2. **Locate**: largest connected region and its centroid (`detect::locate`).
//! 3. **Classify**: distance from the centroid to the zone, mapped to
//!    SAFE / WARNING / DANGER (`zone`).
//! 4. **Annotate**: draw commands for the zone, marker and status text (`annotate`).
//!
//! # Module Structure
//!
//! - `frame`: RGB24 frame container
//! - `ingest`: Frame sources (synthetic, raw stream, image sequence, V4L2)
//! - `detect`: Detector backends and the segmentation/location stages
//! - `pipeline`: Per-frame detection and classification
//! - `config`: Layered session configuration
//! - `ui`: Terminal stage timers and status line

pub mod annotate;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod pipeline;
pub mod throughput;
pub mod ui;
pub mod zone;

pub use annotate::{annotate, render, DrawCommand, Overlay};
pub use config::{FrameSettings, MonitorConfig, SourceSettings};
pub use detect::{
    ColorBlobBackend, ColorBlobConfig, ColorRange, DetectionResult, DetectorBackend, Region,
    ScriptedBackend,
};
pub use frame::Frame;
pub use ingest::{open_source, FrameSource, PixelFormat, SourceStats};
pub use pipeline::{FrameOutcome, MonitorPipeline};
pub use throughput::FpsMeter;
pub use zone::{classify, Point, Proximity, SafetyState, Thresholds, Zone};
