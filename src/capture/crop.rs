use crate::gesture::TransformState;
use serde::{Deserialize, Serialize};

/// Rectangle in source-frame pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole frame
    pub fn full(source_width: u32, source_height: u32) -> Self {
        Self::new(0.0, 0.0, source_width as f64, source_height as f64)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// True when the rectangle lies entirely inside a `width` x `height` frame
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= width as f64
            && self.bottom() <= height as f64
    }

    /// Shift the rectangle back inside the frame, shrinking it only if it is
    /// larger than the frame itself
    pub fn clamped_to(&self, width: u32, height: u32) -> Self {
        let (frame_w, frame_h) = (width as f64, height as f64);
        let crop_w = self.width.min(frame_w);
        let crop_h = self.height.min(frame_h);

        Self {
            x: self.x.clamp(0.0, frame_w - crop_w),
            y: self.y.clamp(0.0, frame_h - crop_h),
            width: crop_w,
            height: crop_h,
        }
    }
}

/// Region of the source frame visible under a `scale` zoom and a pan of
/// (`translate_x`, `translate_y`) source pixels.
///
/// Drawing the returned rectangle stretched back to the source dimensions
/// reproduces the viewport. `scale` must already be at least 1; no bounds
/// checking is applied to the result.
pub fn compute_crop_rect(
    source_width: u32,
    source_height: u32,
    scale: f64,
    translate_x: f64,
    translate_y: f64,
) -> CropRect {
    let source_w = source_width as f64;
    let source_h = source_height as f64;

    let zoomed_width = source_w / scale;
    let zoomed_height = source_h / scale;

    CropRect {
        x: (source_w - zoomed_width) / 2.0 - translate_x,
        y: (source_h - zoomed_height) / 2.0 - translate_y,
        width: zoomed_width,
        height: zoomed_height,
    }
}

/// Map a viewport transform onto the source frame.
///
/// Translation is expressed in viewport pixels, so it is rescaled into
/// source pixels per axis before the crop is computed. When the viewport and
/// the source share dimensions this is exactly [`compute_crop_rect`].
pub fn map_viewport_to_source(
    state: &TransformState,
    source: (u32, u32),
    viewport: (f64, f64),
) -> CropRect {
    let (source_width, source_height) = source;
    let (viewport_width, viewport_height) = viewport;

    let to_source_x = if viewport_width > 0.0 {
        source_width as f64 / viewport_width
    } else {
        1.0
    };
    let to_source_y = if viewport_height > 0.0 {
        source_height as f64 / viewport_height
    } else {
        1.0
    };

    compute_crop_rect(
        source_width,
        source_height,
        state.scale,
        state.translate_x * to_source_x,
        state.translate_y * to_source_y,
    )
}
