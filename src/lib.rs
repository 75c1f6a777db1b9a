pub mod camera;
pub mod capture;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod viewfinder;

pub use camera::{CameraBackend, CameraSession, FacingMode, StillImageCamera, TestPatternCamera, VideoSource};
pub use capture::{compute_crop_rect, map_viewport_to_source, save_capture, CaptureFrame, CropRect, SavedCapture};
pub use config::ViewfinderConfig;
pub use error::{CameraError, CaptureError, EventBusError, Result, ViewfinderError};
pub use events::{EventBus, ViewfinderEvent};
pub use geometry::{distance, midpoint, Point};
pub use gesture::{
    AnimationDriver, FrameHandle, FrameQueue, FrameScheduler, GestureEngine, GesturePhase,
    TouchPoint, TransformState, Velocity,
};
pub use viewfinder::{CapturedStill, GestureTrace, TraceStep, ViewPhase, Viewfinder};
