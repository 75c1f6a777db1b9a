use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result, ViewfinderError};
use crate::gesture::TransformState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::crop::CropRect;

/// Immutable record of one capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureFrame {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    pub source_width: u32,
    pub source_height: u32,
    pub crop_rect: CropRect,
    /// Viewport transform the crop was derived from
    pub transform: TransformState,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl CaptureFrame {
    pub fn new(
        source: (u32, u32),
        viewport: (f64, f64),
        transform: TransformState,
        crop_rect: CropRect,
    ) -> Self {
        let captured_at = Utc::now();
        Self {
            id: captured_at.format("%Y%m%d_%H%M%S_%3f").to_string(),
            captured_at,
            source_width: source.0,
            source_height: source.1,
            crop_rect,
            transform,
            viewport_width: viewport.0,
            viewport_height: viewport.1,
        }
    }

    pub fn image_file_name(&self) -> String {
        format!("{}.jpg", self.id)
    }
}

/// Paths written by [`save_capture`]
#[derive(Debug, Clone)]
pub struct SavedCapture {
    pub image_path: PathBuf,
    pub metadata_path: Option<PathBuf>,
}

/// Write the encoded still and, when enabled, its metadata JSON
pub async fn save_capture(
    frame: &CaptureFrame,
    jpeg: &[u8],
    config: &CaptureConfig,
) -> Result<SavedCapture> {
    let capture_dir = PathBuf::from(&config.path);
    create_dir(&capture_dir).await?;

    let image_path = capture_dir.join(frame.image_file_name());
    fs::write(&image_path, jpeg).await.map_err(|e| {
        ViewfinderError::component(
            "capture",
            format!("Failed to write {}: {}", image_path.display(), e),
        )
    })?;
    info!("Saved capture {} to {}", frame.id, image_path.display());

    let metadata_path = if config.save_metadata {
        Some(save_metadata(frame, &capture_dir).await?)
    } else {
        None
    };

    Ok(SavedCapture {
        image_path,
        metadata_path,
    })
}

async fn save_metadata(frame: &CaptureFrame, capture_dir: &Path) -> Result<PathBuf> {
    let metadata_json = serde_json::to_string_pretty(frame)?;

    let metadata_dir = capture_dir.join("metadata");
    create_dir(&metadata_dir).await?;

    let metadata_path = metadata_dir.join(format!("{}.json", frame.id));
    fs::write(&metadata_path, metadata_json).await.map_err(|e| {
        ViewfinderError::component(
            "capture",
            format!("Failed to write metadata file: {}", e),
        )
    })?;

    debug!("Saved metadata to {}", metadata_path.display());
    Ok(metadata_path)
}

async fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| CaptureError::DirectoryCreation {
            path: path.display().to_string(),
            source: e,
        })?;
    Ok(())
}
