use crate::config::GestureConfig;
use crate::events::{EventBus, ViewfinderEvent};
use crate::geometry::{distance, midpoint};
use std::time::SystemTime;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use super::scheduler::{FrameHandle, FrameQueue, FrameScheduler};
use super::types::{GesturePhase, GestureSession, TouchPoint, TransformState, Velocity};

/// Owns the authoritative viewport transform and drives it from touch input
/// and inertial animation frames.
///
/// Every mutation ends with a publish step; renderers read the published
/// copy through [`GestureEngine::subscribe`].
pub struct GestureEngine<S: FrameScheduler> {
    config: GestureConfig,
    min_scale: f64,
    max_scale: f64,
    state: TransformState,
    published: watch::Sender<TransformState>,
    session: GestureSession,
    phase: GesturePhase,
    scheduler: S,
    pending_frame: Option<FrameHandle>,
    viewport: Option<(f64, f64)>,
    event_bus: Option<EventBus>,
}

impl<S: FrameScheduler> GestureEngine<S> {
    /// Create an engine at its initial transform
    pub fn new(config: GestureConfig, scheduler: S) -> Self {
        // Scale never drops below the full frame
        let min_scale = if config.min_scale.is_nan() {
            1.0
        } else {
            config.min_scale.max(1.0)
        };
        let max_scale = config.max_scale.max(min_scale);
        let initial = TransformState::centered(config.initial_scale.clamp(min_scale, max_scale));
        let (published, _) = watch::channel(initial);

        Self {
            config,
            min_scale,
            max_scale,
            state: initial,
            published,
            session: GestureSession::default(),
            phase: GesturePhase::Idle,
            scheduler,
            pending_frame: None,
            viewport: None,
            event_bus: None,
        }
    }

    /// Attach an event bus for lifecycle events
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Transform applied on start and on every reset
    pub fn initial_state(&self) -> TransformState {
        TransformState::centered(self.config.initial_scale.clamp(self.min_scale, self.max_scale))
    }

    pub fn state(&self) -> TransformState {
        self.state
    }

    /// Last state surfaced to the renderer
    pub fn published(&self) -> TransformState {
        *self.published.borrow()
    }

    /// Subscribe to published transform updates
    pub fn subscribe(&self) -> watch::Receiver<TransformState> {
        self.published.subscribe()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn velocity(&self) -> Velocity {
        self.session.velocity
    }

    pub fn scale_bounds(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Set the on-screen preview size; enables pan bounds
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Some((width, height));
            self.commit();
        } else {
            warn!("Ignoring degenerate viewport {}x{}", width, height);
        }
    }

    pub fn viewport(&self) -> Option<(f64, f64)> {
        self.viewport
    }

    /// Maximum pan magnitude per axis at `scale`, if the viewport is known
    pub fn pan_limits(&self, scale: f64) -> Option<(f64, f64)> {
        self.viewport.map(|(width, height)| {
            (
                ((width - width / scale) / 2.0).max(0.0),
                ((height - height / scale) / 2.0).max(0.0),
            )
        })
    }

    /// Handle touch-start. Only two or more points begin a pinch.
    pub fn touch_start(&mut self, touches: &[TouchPoint]) {
        let (first, second) = match touches {
            [first, second, ..] => (first.position(), second.position()),
            _ => {
                trace!("Touch start with {} point(s), not pinching", touches.len());
                return;
            }
        };

        self.cancel_inertia();

        let initial_distance = distance(first, second);
        self.session = GestureSession::begin(initial_distance, midpoint(first, second));
        self.phase = GesturePhase::Pinching;

        debug!("Pinch started at distance {:.1}", initial_distance);
        self.emit(ViewfinderEvent::GestureStarted {
            initial_distance,
            timestamp: SystemTime::now(),
        });
    }

    /// Handle touch-move while pinching
    pub fn touch_move(&mut self, touches: &[TouchPoint]) {
        if self.phase != GesturePhase::Pinching {
            return;
        }

        let (first, second) = match touches {
            [first, second, ..] => (first.position(), second.position()),
            _ => return,
        };

        let Some(initial_distance) = self.session.initial_distance else {
            return;
        };

        // A zero initial distance yields +inf, which the clamp below pins to
        // max_scale. Only 0/0 has no usable scale.
        let ratio = distance(first, second) / initial_distance;
        if ratio.is_nan() {
            debug!(
                "Skipping pinch move with undefined distance ratio (initial {:.3})",
                initial_distance
            );
            return;
        }

        let prior_scale = self.state.scale;
        let clamped_scale = self.clamp_scale(prior_scale * ratio);
        let scale_diff = clamped_scale - prior_scale;

        if scale_diff < 0.0 {
            // Zooming out recenters the view.
            self.state.translate_x = 0.0;
            self.state.translate_y = 0.0;
        }

        self.state.scale = clamped_scale;
        self.session.last_pinch_center = midpoint(first, second);

        self.clamp_translation();
        self.session.velocity = Velocity::between(&self.published(), &self.state);
        self.publish();

        trace!(
            "Pinch move: scale {:.4} (diff {:+.4})",
            clamped_scale,
            scale_diff
        );
    }

    /// Handle touch-end. `remaining` holds the touches still down.
    pub fn touch_end(&mut self, remaining: &[TouchPoint]) {
        if self.phase != GesturePhase::Pinching || remaining.len() >= 2 {
            return;
        }

        self.session.initial_distance = None;
        self.emit(ViewfinderEvent::GestureEnded {
            scale: self.state.scale,
            timestamp: SystemTime::now(),
        });

        let velocity = self.session.velocity;
        self.start_inertia(velocity);
    }

    /// Enter inertial decay with an explicit seed velocity
    pub fn fling(&mut self, velocity: Velocity) {
        self.session = GestureSession {
            initial_distance: None,
            last_pinch_center: self.session.last_pinch_center,
            velocity,
        };
        self.start_inertia(velocity);
    }

    /// Advance inertia by one frame.
    ///
    /// Returns `true` while the animation continues. Frames for handles that
    /// were cancelled or superseded are ignored.
    pub fn on_animation_frame(&mut self, handle: FrameHandle) -> bool {
        if self.pending_frame != Some(handle) {
            trace!("Ignoring stale frame {}", handle.id());
            return false;
        }

        self.pending_frame = None;

        if self.phase != GesturePhase::Inertial {
            return false;
        }

        let velocity = self.session.velocity.scaled(self.config.friction);
        self.session.velocity = velocity;

        self.state.scale = self.clamp_scale(self.state.scale + velocity.scale);
        self.state.translate_x += velocity.x;
        self.state.translate_y += velocity.y;
        self.commit();

        if velocity.exceeds(self.config.velocity_epsilon) {
            self.pending_frame = Some(self.scheduler.request_frame());
            true
        } else {
            self.phase = GesturePhase::Idle;
            debug!("Inertia settled at scale {:.4}", self.state.scale);
            self.emit(ViewfinderEvent::InertiaSettled { state: self.state });
            false
        }
    }

    /// Stop any motion and return the current state as of this instant
    pub fn freeze(&mut self) -> TransformState {
        self.cancel_inertia();
        self.session = GestureSession::default();
        self.phase = GesturePhase::Idle;
        self.state
    }

    /// Return to the initial transform. Calling it repeatedly is harmless.
    pub fn reset(&mut self) -> TransformState {
        self.cancel_inertia();
        self.session = GestureSession::default();
        self.phase = GesturePhase::Idle;
        self.state = self.initial_state();
        self.commit();

        info!("View reset to scale {:.2}", self.state.scale);
        self.emit(ViewfinderEvent::ViewReset { state: self.state });
        self.state
    }

    fn start_inertia(&mut self, velocity: Velocity) {
        self.cancel_inertia();
        self.session.velocity = velocity;
        self.phase = GesturePhase::Inertial;
        self.pending_frame = Some(self.scheduler.request_frame());
        debug!(
            "Inertia started: scale {:+.4}, x {:+.2}, y {:+.2}",
            velocity.scale, velocity.x, velocity.y
        );
    }

    fn cancel_inertia(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
            trace!("Cancelled frame {}", handle.id());
        }
        if self.phase == GesturePhase::Inertial {
            self.phase = GesturePhase::Idle;
        }
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.min_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    fn clamp_translation(&mut self) {
        if let Some((limit_x, limit_y)) = self.pan_limits(self.state.scale) {
            self.state.translate_x = self.state.translate_x.clamp(-limit_x, limit_x);
            self.state.translate_y = self.state.translate_y.clamp(-limit_y, limit_y);
        }
    }

    fn commit(&mut self) {
        self.clamp_translation();
        self.publish();
    }

    fn publish(&self) {
        self.published.send_replace(self.state);
    }

    fn emit(&self, event: ViewfinderEvent) {
        if let Some(event_bus) = &self.event_bus {
            let _ = event_bus.publish(event);
        }
    }
}

impl GestureEngine<FrameQueue> {
    /// Fire every queued frame once. Returns how many frames ran.
    pub fn advance_frame(&mut self) -> usize {
        let due = self.scheduler.take_due();
        let count = due.len();
        for handle in due {
            self.on_animation_frame(handle);
        }
        count
    }

    /// Step frames until inertia settles or `max_frames` is reached
    pub fn run_to_rest(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && !self.scheduler.is_idle() {
            frames += self.advance_frame();
        }
        frames
    }
}
