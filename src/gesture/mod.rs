mod driver;
mod engine;
mod scheduler;
mod types;

pub use driver::AnimationDriver;
pub use engine::GestureEngine;
pub use scheduler::{FrameHandle, FrameQueue, FrameScheduler};
pub use types::{GesturePhase, GestureSession, TouchPoint, TransformState, Velocity};
