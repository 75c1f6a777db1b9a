use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewfinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl ViewfinderError {
    pub fn component<C: Into<String>, M: Into<String>>(component: C, message: M) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Shown when the camera stream cannot be opened
pub const ACCESS_FAILED_MESSAGE: &str = "Error accessing camera. Please try again.";

/// Shown when a still cannot be taken from an open stream
pub const CAPTURE_FAILED_MESSAGE: &str = "Error capturing photo. Please try again.";

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera device unavailable ({facing}): {details}")]
    DeviceUnavailable { facing: String, details: String },

    #[error("Camera has not been started")]
    NotStarted,

    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl CameraError {
    /// Message suitable for showing to the person holding the camera
    pub fn user_message(&self) -> String {
        match self {
            CameraError::DeviceUnavailable { .. } | CameraError::InvalidDimensions { .. } => {
                ACCESS_FAILED_MESSAGE.to_string()
            }
            CameraError::NotStarted => CAPTURE_FAILED_MESSAGE.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Camera is not live (state: {state})")]
    NotLive { state: String },

    #[error("Crop rectangle does not overlap the source frame: {details}")]
    EmptyCrop { details: String },

    #[error("JPEG encoding failed: {details}")]
    Encoding { details: String },

    #[error("Failed to create capture directory {path}: {source}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },
}

pub type Result<T> = std::result::Result<T, ViewfinderError>;
