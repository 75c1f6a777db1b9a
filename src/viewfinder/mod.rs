mod controller;
mod trace;

pub use controller::{CapturedStill, ViewPhase, Viewfinder};
pub use trace::{GestureTrace, TraceStep};
