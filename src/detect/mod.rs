//! Object detection: color segmentation and largest-region location.

mod backend;
pub mod backends;
pub mod color;
pub mod locate;
mod mask;
mod result;
pub mod segment;

pub use backend::DetectorBackend;
pub use backends::{ColorBlobBackend, ColorBlobConfig, ScriptedBackend};
pub use color::{rgb_to_hsv, ColorRange};
pub use locate::ObjectLocator;
pub use mask::Mask;
pub use result::{Bounds, DetectionResult, Moments, Region};
pub use segment::ColorSegmenter;
