use crate::error::{CameraError, Result};
use image::RgbImage;
use std::path::PathBuf;
use tracing::info;

use super::session::{CameraBackend, FacingMode, VideoSource};

/// Camera backend that serves a single still image from disk
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl CameraBackend for StillImageCamera {
    type Source = StillImageSource;

    fn acquire(&mut self, facing: FacingMode) -> Result<Self::Source> {
        let image = image::open(&self.path)
            .map_err(|e| CameraError::DeviceUnavailable {
                facing: facing.to_string(),
                details: format!("{}: {}", self.path.display(), e),
            })?
            .to_rgb8();

        info!(
            "Loaded still image source {} ({}x{})",
            self.path.display(),
            image.width(),
            image.height()
        );
        Ok(StillImageSource { image })
    }

    fn release(&mut self, _source: Self::Source) {}
}

/// Stream produced by [`StillImageCamera`]
#[derive(Debug)]
pub struct StillImageSource {
    image: RgbImage,
}

impl VideoSource for StillImageSource {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn grab_frame(&mut self) -> Result<RgbImage> {
        Ok(self.image.clone())
    }
}
