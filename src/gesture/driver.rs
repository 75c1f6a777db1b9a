use crate::config::GestureConfig;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::engine::GestureEngine;
use super::scheduler::FrameQueue;

/// Fires queued animation frames on a fixed interval, standing in for a
/// display's paint loop.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    frame_interval: Duration,
    max_frames: usize,
}

impl AnimationDriver {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            max_frames: 10_000,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(Duration::from_millis(config.frame_interval_ms.max(1)))
    }

    /// Upper bound on frames fired per run
    pub fn with_frame_limit(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Fire frames until no frame is pending. Returns the number fired.
    pub async fn run_until_settled(&self, engine: &mut GestureEngine<FrameQueue>) -> usize {
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut fired = 0;
        while !engine.scheduler().is_idle() {
            if fired >= self.max_frames {
                warn!(
                    "Animation did not settle within {} frames, stopping driver",
                    self.max_frames
                );
                break;
            }

            ticker.tick().await;
            fired += engine.advance_frame();
        }

        debug!("Animation driver fired {} frame(s)", fired);
        fired
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::from_config(&GestureConfig::default())
    }
}
