mod crop;
mod metadata;
mod render;
#[cfg(test)]
mod tests;

pub use crop::{compute_crop_rect, map_viewport_to_source, CropRect};
pub use metadata::{save_capture, CaptureFrame, SavedCapture};
pub use render::{encode_jpeg, render_crop};
