use crate::error::{CameraError, Result};
use image::{Rgb, RgbImage};
use tracing::debug;

use super::session::{CameraBackend, FacingMode, VideoSource};

/// Camera backend that serves a synthetic gradient, for hosts without a
/// camera and for tests
#[derive(Debug, Clone)]
pub struct TestPatternCamera {
    width: u32,
    height: u32,
    available: bool,
    acquired: u32,
    released: u32,
}

impl TestPatternCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            acquired: 0,
            released: 0,
        }
    }

    /// Make subsequent acquisitions fail as if the device were missing
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn acquired_count(&self) -> u32 {
        self.acquired
    }

    pub fn released_count(&self) -> u32 {
        self.released
    }

    /// Streams acquired and not yet released
    pub fn open_streams(&self) -> u32 {
        self.acquired - self.released
    }
}

impl CameraBackend for TestPatternCamera {
    type Source = TestPatternSource;

    fn acquire(&mut self, facing: FacingMode) -> Result<Self::Source> {
        if !self.available {
            return Err(CameraError::DeviceUnavailable {
                facing: facing.to_string(),
                details: "test pattern camera disabled".to_string(),
            }
            .into());
        }

        self.acquired += 1;
        Ok(TestPatternSource {
            width: self.width,
            height: self.height,
            frame_index: 0,
        })
    }

    fn release(&mut self, _source: Self::Source) {
        self.released += 1;
    }
}

/// Stream produced by [`TestPatternCamera`]
#[derive(Debug)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame_index: u64,
}

impl TestPatternSource {
    /// Color at (x, y): red ramps left to right, green top to bottom
    pub fn pattern_pixel(width: u32, height: u32, x: u32, y: u32) -> Rgb<u8> {
        let r = ((x as u64 * 255) / width.max(1) as u64) as u8;
        let g = ((y as u64 * 255) / height.max(1) as u64) as u8;
        let b = (((x + y) as u64 * 255) / (width + height).max(1) as u64) as u8;
        Rgb([r, g, b])
    }
}

impl VideoSource for TestPatternSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Result<RgbImage> {
        self.frame_index += 1;
        debug!("Test pattern frame {}", self.frame_index);

        let (width, height) = (self.width, self.height);
        Ok(RgbImage::from_fn(width, height, |x, y| {
            Self::pattern_pixel(width, height, x, y)
        }))
    }
}
