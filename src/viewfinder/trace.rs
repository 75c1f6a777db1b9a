use crate::camera::CameraBackend;
use crate::error::{Result, ViewfinderError};
use crate::gesture::{FrameQueue, TouchPoint, Velocity};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::controller::Viewfinder;

/// One recorded input step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceStep {
    Start { touches: Vec<TouchPoint> },
    Move { touches: Vec<TouchPoint> },
    End {
        #[serde(default)]
        touches: Vec<TouchPoint>,
    },
    /// Let `count` animation frames elapse
    Frames { count: usize },
    /// Seed inertia directly
    Fling { scale: f64, x: f64, y: f64 },
}

/// A recorded touch session that can be replayed against a viewfinder
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureTrace {
    /// Preview size the trace was recorded at (width, height)
    #[serde(default)]
    pub viewport: Option<(f64, f64)>,
    pub steps: Vec<TraceStep>,
}

impl GestureTrace {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            ViewfinderError::component(
                "gesture_trace",
                format!("Failed to read {}: {}", path.display(), e),
            )
        })?;

        let trace = Self::from_json(&json)?;
        info!(
            "Loaded gesture trace {} ({} steps)",
            path.display(),
            trace.steps.len()
        );
        Ok(trace)
    }

    /// Feed every step to `viewfinder`. Returns the animation frames fired.
    pub fn replay<B: CameraBackend>(&self, viewfinder: &mut Viewfinder<B, FrameQueue>) -> usize {
        if let Some((width, height)) = self.viewport {
            viewfinder.set_viewport(width, height);
        }

        let mut frames = 0;
        for step in &self.steps {
            debug!("Replaying {:?}", step);
            match step {
                TraceStep::Start { touches } => viewfinder.touch_start(touches),
                TraceStep::Move { touches } => viewfinder.touch_move(touches),
                TraceStep::End { touches } => viewfinder.touch_end(touches),
                TraceStep::Frames { count } => {
                    for _ in 0..*count {
                        frames += viewfinder.advance_frame();
                    }
                }
                TraceStep::Fling { scale, x, y } => {
                    viewfinder.fling(Velocity::new(*scale, *x, *y))
                }
            }
        }
        frames
    }
}
