use crate::capture::CropRect;
use crate::error::EventBusError;
use crate::gesture::TransformState;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events that can occur in the viewfinder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ViewfinderEvent {
    /// A camera stream was acquired
    CameraStarted {
        facing_mode: String,
        width: u32,
        height: u32,
        timestamp: SystemTime,
    },
    /// The camera stream was released
    CameraStopped { timestamp: SystemTime },
    /// Two fingers touched down and a pinch began
    GestureStarted {
        initial_distance: f64,
        timestamp: SystemTime,
    },
    /// Fingers lifted; inertial decay takes over
    GestureEnded { scale: f64, timestamp: SystemTime },
    /// Inertial decay came to rest
    InertiaSettled { state: TransformState },
    /// A still was captured from the visible region
    CaptureTaken { capture_id: String, crop: CropRect },
    /// The view was returned to its initial transform
    ViewReset { state: TransformState },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
}

impl ViewfinderEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            ViewfinderEvent::CameraStarted {
                facing_mode,
                width,
                height,
                ..
            } => format!("Camera started ({}, {}x{})", facing_mode, width, height),
            ViewfinderEvent::CameraStopped { .. } => "Camera stopped".to_string(),
            ViewfinderEvent::GestureStarted {
                initial_distance, ..
            } => format!("Pinch started at distance {:.1}", initial_distance),
            ViewfinderEvent::GestureEnded { scale, .. } => {
                format!("Pinch ended at scale {:.3}", scale)
            }
            ViewfinderEvent::InertiaSettled { state } => {
                format!("Inertia settled at scale {:.3}", state.scale)
            }
            ViewfinderEvent::CaptureTaken { capture_id, crop } => format!(
                "Capture {} taken ({:.1}x{:.1} at {:.1},{:.1})",
                capture_id, crop.width, crop.height, crop.x, crop.y
            ),
            ViewfinderEvent::ViewReset { state } => {
                format!("View reset to scale {:.3}", state.scale)
            }
            ViewfinderEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            ViewfinderEvent::CameraStarted { .. } => "camera_started",
            ViewfinderEvent::CameraStopped { .. } => "camera_stopped",
            ViewfinderEvent::GestureStarted { .. } => "gesture_started",
            ViewfinderEvent::GestureEnded { .. } => "gesture_ended",
            ViewfinderEvent::InertiaSettled { .. } => "inertia_settled",
            ViewfinderEvent::CaptureTaken { .. } => "capture_taken",
            ViewfinderEvent::ViewReset { .. } => "view_reset",
            ViewfinderEvent::SystemError { .. } => "system_error",
        }
    }
}

/// Event bus for component coordination using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ViewfinderEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<ViewfinderEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Publishing never blocks, so it is safe to call from touch handlers
    /// and animation frames.
    pub fn publish(&self, event: ViewfinderEvent) -> Result<usize, EventBusError> {
        match &event {
            ViewfinderEvent::CameraStarted { .. } | ViewfinderEvent::CaptureTaken { .. } => {
                info!("{}", event.description());
            }
            ViewfinderEvent::CameraStopped { .. } => {
                warn!("{}", event.description());
            }
            ViewfinderEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            _ => {
                if self.debug_logging {
                    debug!("Event: {}", event.description());
                }
            }
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_basic_operations() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let subscriber_count = event_bus
            .publish(ViewfinderEvent::GestureEnded {
                scale: 2.5,
                timestamp: SystemTime::now(),
            })
            .unwrap();
        assert_eq!(subscriber_count, 1);

        match receiver.recv().await.unwrap() {
            ViewfinderEvent::GestureEnded { scale, .. } => assert_eq!(scale, 2.5),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let event_bus = EventBus::new(10);
        let result = event_bus.publish(ViewfinderEvent::CameraStopped {
            timestamp: SystemTime::now(),
        });
        assert!(result.is_err());
        assert!(!event_bus.has_subscribers());
    }

    #[test]
    fn test_event_type_and_description() {
        let event = ViewfinderEvent::SystemError {
            component: "capture".to_string(),
            error: "empty crop".to_string(),
        };

        assert_eq!(event.event_type(), "system_error");
        assert_eq!(event.description(), "Error in capture: empty crop");
    }
}
