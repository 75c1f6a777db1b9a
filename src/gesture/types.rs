use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// A single active touch as delivered by the input source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub client_x: f64,
    pub client_y: f64,
}

impl TouchPoint {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }
}

/// Continuous zoom/pan state of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: f64,
    /// Horizontal pan in on-screen pixels
    pub translate_x: f64,
    /// Vertical pan in on-screen pixels
    pub translate_y: f64,
}

impl TransformState {
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    /// No zoom, no pan
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Zoomed to `scale` and centered
    pub fn centered(scale: f64) -> Self {
        Self::new(scale, 0.0, 0.0)
    }

    pub fn is_centered(&self) -> bool {
        self.translate_x == 0.0 && self.translate_y == 0.0
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::identity()
    }
}

/// Per-frame deltas that seed inertial decay
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity {
        scale: 0.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(scale: f64, x: f64, y: f64) -> Self {
        Self { scale, x, y }
    }

    /// Delta from `previous` to `current`
    pub fn between(previous: &TransformState, current: &TransformState) -> Self {
        Self {
            scale: current.scale - previous.scale,
            x: current.translate_x - previous.translate_x,
            y: current.translate_y - previous.translate_y,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            scale: self.scale * factor,
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// True while any component is still larger than `epsilon` in magnitude
    pub fn exceeds(&self, epsilon: f64) -> bool {
        self.scale.abs() > epsilon || self.x.abs() > epsilon || self.y.abs() > epsilon
    }
}

/// Transient state for one two-finger interaction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSession {
    /// Pinch distance at gesture start; absent with fewer than two touches
    pub initial_distance: Option<f64>,
    /// Tracked for hosts; translation never reads it
    pub last_pinch_center: Point,
    pub velocity: Velocity,
}

impl GestureSession {
    pub fn begin(initial_distance: f64, center: Point) -> Self {
        Self {
            initial_distance: Some(initial_distance),
            last_pinch_center: center,
            velocity: Velocity::ZERO,
        }
    }
}

/// Logical state of the gesture engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GesturePhase {
    /// No active multi-touch and no motion
    Idle,
    /// Two touches active, live tracking
    Pinching,
    /// Touches released, decaying toward rest
    Inertial,
}

impl std::fmt::Display for GesturePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GesturePhase::Idle => "idle",
            GesturePhase::Pinching => "pinching",
            GesturePhase::Inertial => "inertial",
        };
        f.write_str(name)
    }
}
