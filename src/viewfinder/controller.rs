use crate::camera::{CameraBackend, CameraSession, FacingMode};
use crate::capture::{encode_jpeg, map_viewport_to_source, render_crop, CaptureFrame};
use crate::config::ViewfinderConfig;
use crate::error::{
    CaptureError, Result, ViewfinderError, ACCESS_FAILED_MESSAGE, CAPTURE_FAILED_MESSAGE,
};
use crate::events::{EventBus, ViewfinderEvent};
use crate::gesture::{
    AnimationDriver, FrameHandle, FrameQueue, FrameScheduler, GestureEngine, TouchPoint,
    TransformState, Velocity,
};
use image::RgbImage;
use std::fmt;
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// Where the viewfinder is in its start / preview / capture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// No camera stream held
    Inactive,
    /// Live preview accepting gestures
    Live,
    /// A still was taken; the view stays frozen until reset
    Frozen,
}

impl fmt::Display for ViewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewPhase::Inactive => f.write_str("inactive"),
            ViewPhase::Live => f.write_str("live"),
            ViewPhase::Frozen => f.write_str("frozen"),
        }
    }
}

/// A captured still matching what the viewport showed
#[derive(Debug, Clone)]
pub struct CapturedStill {
    pub frame: CaptureFrame,
    pub image: RgbImage,
    pub jpeg: Vec<u8>,
}

/// Camera viewfinder: live pinch-zoom preview plus viewport-exact capture
pub struct Viewfinder<B: CameraBackend, S: FrameScheduler = FrameQueue> {
    config: ViewfinderConfig,
    camera: CameraSession<B>,
    engine: GestureEngine<S>,
    event_bus: EventBus,
    phase: ViewPhase,
    viewport: Option<(f64, f64)>,
    message: Option<String>,
}

impl<B: CameraBackend, S: FrameScheduler> Viewfinder<B, S> {
    pub fn new(
        config: ViewfinderConfig,
        backend: B,
        scheduler: S,
        event_bus: EventBus,
    ) -> Result<Self> {
        let facing: FacingMode = config
            .camera
            .facing_mode
            .parse()
            .map_err(|e: String| ViewfinderError::component("viewfinder", e))?;

        let engine =
            GestureEngine::new(config.gesture.clone(), scheduler).with_event_bus(event_bus.clone());

        Ok(Self {
            camera: CameraSession::new(backend, facing),
            engine,
            event_bus,
            phase: ViewPhase::Inactive,
            viewport: None,
            message: None,
            config,
        })
    }

    /// Acquire the camera and enter live preview at the initial transform
    pub fn start_camera(&mut self) -> Result<()> {
        info!("Starting camera ({})", self.camera.facing());
        self.acquire_stream()?;
        self.engine.reset();
        self.phase = ViewPhase::Live;
        self.message = None;
        Ok(())
    }

    /// Release the camera and stop all motion
    pub fn stop_camera(&mut self) {
        self.engine.freeze();
        if self.camera.release() {
            let _ = self.event_bus.publish(ViewfinderEvent::CameraStopped {
                timestamp: SystemTime::now(),
            });
        }
        self.phase = ViewPhase::Inactive;
    }

    /// Set the on-screen preview size in pixels
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Some((width, height));
            self.engine.set_viewport(width, height);
        } else {
            warn!("Ignoring degenerate viewport {}x{}", width, height);
        }
    }

    pub fn touch_start(&mut self, touches: &[TouchPoint]) {
        if self.accepts_input() {
            self.engine.touch_start(touches);
        }
    }

    pub fn touch_move(&mut self, touches: &[TouchPoint]) {
        if self.accepts_input() {
            self.engine.touch_move(touches);
        }
    }

    pub fn touch_end(&mut self, remaining: &[TouchPoint]) {
        if self.accepts_input() {
            self.engine.touch_end(remaining);
        }
    }

    /// Seed inertia directly, as a host-driven fling
    pub fn fling(&mut self, velocity: Velocity) {
        if self.accepts_input() {
            self.engine.fling(velocity);
        }
    }

    /// Forward a fired animation frame to the gesture engine
    pub fn on_animation_frame(&mut self, handle: FrameHandle) -> bool {
        self.engine.on_animation_frame(handle)
    }

    /// Take a still of exactly what the viewport shows and freeze the view.
    ///
    /// Motion stops at the trigger either way. On failure the view stays live
    /// so the user can retry.
    pub fn capture(&mut self) -> Result<CapturedStill> {
        if self.phase != ViewPhase::Live {
            return Err(CaptureError::NotLive {
                state: self.phase.to_string(),
            }
            .into());
        }

        let state = self.engine.freeze();

        let still = match self.take_still(state) {
            Ok(still) => still,
            Err(e) => {
                self.report_error("capture", &e, CAPTURE_FAILED_MESSAGE.to_string());
                return Err(e);
            }
        };

        self.phase = ViewPhase::Frozen;
        self.message = Some("Photo captured".to_string());
        let _ = self.event_bus.publish(ViewfinderEvent::CaptureTaken {
            capture_id: still.frame.id.clone(),
            crop: still.frame.crop_rect,
        });

        Ok(still)
    }

    /// Return to live preview at the initial transform, re-acquiring the camera
    pub fn reset(&mut self) -> Result<TransformState> {
        let state = self.engine.reset();
        self.phase = ViewPhase::Inactive;
        self.acquire_stream()?;
        self.phase = ViewPhase::Live;
        self.message = None;
        Ok(state)
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn transform(&self) -> TransformState {
        self.engine.published()
    }

    pub fn viewport(&self) -> Option<(f64, f64)> {
        self.viewport
    }

    /// Last status message for the user, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn engine(&self) -> &GestureEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GestureEngine<S> {
        &mut self.engine
    }

    pub fn camera(&self) -> &CameraSession<B> {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraSession<B> {
        &mut self.camera
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn accepts_input(&self) -> bool {
        self.phase == ViewPhase::Live
    }

    fn acquire_stream(&mut self) -> Result<()> {
        match self.camera.acquire() {
            Ok((width, height)) => {
                let _ = self.event_bus.publish(ViewfinderEvent::CameraStarted {
                    facing_mode: self.camera.facing().to_string(),
                    width,
                    height,
                    timestamp: SystemTime::now(),
                });
                Ok(())
            }
            Err(e) => {
                let user_message = match &e {
                    ViewfinderError::Camera(camera_error) => camera_error.user_message(),
                    _ => ACCESS_FAILED_MESSAGE.to_string(),
                };
                self.report_error("camera", &e, user_message);
                Err(e)
            }
        }
    }

    fn take_still(&mut self, state: TransformState) -> Result<CapturedStill> {
        let source_frame = self.camera.grab_frame()?;
        let source = source_frame.dimensions();
        let viewport = self
            .viewport
            .unwrap_or((source.0 as f64, source.1 as f64));

        let mut crop = map_viewport_to_source(&state, source, viewport);
        if self.config.capture.clamp_crop {
            crop = crop.clamped_to(source.0, source.1);
        }
        debug!(
            "Capture crop ({:.1}, {:.1}) {:.1}x{:.1} from {}x{} at scale {:.3}",
            crop.x, crop.y, crop.width, crop.height, source.0, source.1, state.scale
        );

        let image = render_crop(&source_frame, &crop)?;
        let jpeg = encode_jpeg(&image, self.config.capture.jpeg_quality)?;
        let frame = CaptureFrame::new(source, viewport, state, crop);

        Ok(CapturedStill { frame, image, jpeg })
    }

    fn report_error(&mut self, component: &str, e: &ViewfinderError, user_message: String) {
        error!("Error in {}: {}", component, e);
        self.message = Some(user_message);
        let _ = self.event_bus.publish(ViewfinderEvent::SystemError {
            component: component.to_string(),
            error: e.to_string(),
        });
    }
}

impl<B: CameraBackend> Viewfinder<B, FrameQueue> {
    /// Fire every queued animation frame once
    pub fn advance_frame(&mut self) -> usize {
        self.engine.advance_frame()
    }

    /// Let inertia run to rest on the driver's clock
    pub async fn settle(&mut self, driver: &AnimationDriver) -> usize {
        driver.run_until_settled(&mut self.engine).await
    }
}
