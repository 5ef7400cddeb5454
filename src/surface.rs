//! Presentation targets for finished frames.

use std::path::Path;

use image::RgbaImage;
use tracing::{debug, info};

use crate::error::{RenderError, Result};

/// Something that can display a finished RGBA frame.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;
    /// Displays `rgba`, `width * height * 4` bytes, row-major from the top-left.
    fn present(&mut self, rgba: &[u8]) -> Result<()>;
}

/// Headless surface keeping the last presented frame as an image.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
    frames: u64,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            frames: 0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Writes the last frame; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.image.save(path)?;
        info!(path = %path.display(), "saved frame");
        Ok(())
    }
}

impl Surface for ImageSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        debug!(width, height, "resizing image surface");
        self.image = RgbaImage::new(width, height);
        Ok(())
    }

    fn present(&mut self, rgba: &[u8]) -> Result<()> {
        if rgba.len() != self.image.as_raw().len() {
            return Err(RenderError::Surface(format!(
                "expected {} bytes, got {}",
                self.image.as_raw().len(),
                rgba.len()
            )));
        }
        self.image.copy_from_slice(rgba);
        self.frames += 1;
        Ok(())
    }
}
