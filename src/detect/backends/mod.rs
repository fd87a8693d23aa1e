pub mod color_blob;
pub mod scripted;

pub use color_blob::{ColorBlobBackend, ColorBlobConfig};
pub use scripted::ScriptedBackend;
