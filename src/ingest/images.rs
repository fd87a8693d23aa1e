//! Still-image sequence source.
//!
//! Plays the PNG and JPEG files of a directory in file-name order. Every image
//! must match the configured frame size.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use super::{FrameSource, SourceStats};
use crate::frame::Frame;

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Configuration for an image sequence source.
#[derive(Clone, Debug)]
pub struct ImageSequenceConfig {
    pub dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

pub struct ImageSequenceSource {
    config: ImageSequenceConfig,
    files: Vec<PathBuf>,
    next: usize,
    frame_count: u64,
    last_error: Option<String>,
}

impl ImageSequenceSource {
    pub fn new(config: ImageSequenceConfig) -> Result<Self> {
        if config.dir.as_os_str().is_empty() {
            return Err(anyhow!("image sequence source requires a directory"));
        }
        Ok(Self {
            config,
            files: Vec::new(),
            next: 0,
            frame_count: 0,
            last_error: None,
        })
    }

    /// Number of images found by `connect`.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn connect(&mut self) -> Result<()> {
        let entries = std::fs::read_dir(&self.config.dir)
            .with_context(|| format!("read image directory {}", self.config.dir.display()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(anyhow!(
                "no png or jpeg images in {}",
                self.config.dir.display()
            ));
        }
        files.sort();
        log::info!(
            "ImageSequenceSource: {} images in {}",
            files.len(),
            self.config.dir.display()
        );
        self.files = files;
        self.next = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let image = image::open(path)
            .with_context(|| format!("decode image {}", path.display()))
            .map_err(|err| {
                self.last_error = Some(err.to_string());
                err
            })?
            .to_rgb8();
        if image.dimensions() != (self.config.width, self.config.height) {
            let (w, h) = image.dimensions();
            let msg = format!(
                "image {} is {}x{}, expected {}x{}",
                path.display(),
                w,
                h,
                self.config.width,
                self.config.height
            );
            self.last_error = Some(msg.clone());
            return Err(anyhow!(msg));
        }

        self.frame_count += 1;
        Ok(Some(Frame::from_rgb_image(image)?.with_seq(self.frame_count)))
    }

    fn is_healthy(&self) -> bool {
        self.last_error.is_none()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            url: format!("images:{}", self.config.dir.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn config(dir: &Path) -> ImageSequenceConfig {
        ImageSequenceConfig {
            dir: dir.to_path_buf(),
            width: 4,
            height: 3,
        }
    }

    #[test]
    fn plays_images_in_name_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        RgbImage::from_pixel(4, 3, Rgb([2, 2, 2])).save(dir.path().join("b.png"))?;
        RgbImage::from_pixel(4, 3, Rgb([1, 1, 1])).save(dir.path().join("a.png"))?;
        std::fs::write(dir.path().join("notes.txt"), "skip me")?;

        let mut source = ImageSequenceSource::new(config(dir.path()))?;
        source.connect()?;
        assert_eq!(source.len(), 2);
        assert_eq!(source.next_frame()?.and_then(|f| f.pixel(0, 0)), Some([1, 1, 1]));
        assert_eq!(source.next_frame()?.and_then(|f| f.pixel(3, 2)), Some([2, 2, 2]));
        assert!(source.next_frame()?.is_none());
        assert_eq!(source.stats().frames_captured, 2);
        Ok(())
    }

    #[test]
    fn rejects_mismatched_dimensions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        RgbImage::new(8, 8).save(dir.path().join("frame.png"))?;
        let mut source = ImageSequenceSource::new(config(dir.path()))?;
        source.connect()?;
        assert!(source.next_frame().is_err());
        assert!(!source.is_healthy());
        Ok(())
    }

    #[test]
    fn empty_directory_fails_on_connect() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut source = ImageSequenceSource::new(config(dir.path()))?;
        assert!(source.connect().is_err());
        Ok(())
    }
}
