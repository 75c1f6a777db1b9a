use crate::error::{CameraError, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Which way the requested camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointed away from the user
    Environment,
    /// Front camera
    User,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => f.write_str("environment"),
            FacingMode::User => f.write_str("user"),
        }
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            "user" | "front" => Ok(FacingMode::User),
            other => Err(format!("Unknown facing mode '{}'", other)),
        }
    }
}

/// A live video source that can be sampled into a still
pub trait VideoSource {
    /// Native frame dimensions (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Draw the current frame into an off-screen buffer
    fn grab_frame(&mut self) -> Result<RgbImage>;
}

/// Acquires and releases video sources
pub trait CameraBackend {
    type Source: VideoSource;

    fn acquire(&mut self, facing: FacingMode) -> Result<Self::Source>;

    fn release(&mut self, source: Self::Source);
}

/// Scoped ownership of one camera stream.
///
/// At most one source is held at a time; acquiring again releases the
/// previous source first, and dropping the session releases it.
pub struct CameraSession<B: CameraBackend> {
    backend: B,
    facing: FacingMode,
    source: Option<B::Source>,
}

impl<B: CameraBackend> CameraSession<B> {
    pub fn new(backend: B, facing: FacingMode) -> Self {
        Self {
            backend,
            facing,
            source: None,
        }
    }

    /// Acquire a fresh stream, releasing any current one first
    pub fn acquire(&mut self) -> Result<(u32, u32)> {
        self.release();

        let source = self.backend.acquire(self.facing)?;
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            self.backend.release(source);
            return Err(CameraError::InvalidDimensions { width, height }.into());
        }

        info!(
            "Camera stream acquired ({}, {}x{})",
            self.facing, width, height
        );
        self.source = Some(source);
        Ok((width, height))
    }

    /// Release the current stream. Returns whether one was held.
    pub fn release(&mut self) -> bool {
        match self.source.take() {
            Some(source) => {
                debug!("Releasing camera stream ({})", self.facing);
                self.backend.release(source);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(|source| source.dimensions())
    }

    pub fn grab_frame(&mut self) -> Result<RgbImage> {
        match self.source.as_mut() {
            Some(source) => source.grab_frame(),
            None => Err(CameraError::NotStarted.into()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: CameraBackend> Drop for CameraSession<B> {
    fn drop(&mut self) {
        self.release();
    }
}
