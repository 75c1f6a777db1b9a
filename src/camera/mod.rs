mod mock;
mod session;
mod still;
#[cfg(test)]
mod tests;

pub use mock::{TestPatternCamera, TestPatternSource};
pub use session::{CameraBackend, CameraSession, FacingMode, VideoSource};
pub use still::{StillImageCamera, StillImageSource};
