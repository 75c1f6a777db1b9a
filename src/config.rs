use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ViewfinderConfig {
    pub gesture: GestureConfig,
    pub camera: CameraConfig,
    pub capture: CaptureConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GestureConfig {
    /// Lower zoom bound (no zoom)
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,

    /// Upper zoom bound
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    /// Scale applied on camera start and on every reset
    #[serde(default = "default_initial_scale")]
    pub initial_scale: f64,

    /// Per-frame velocity multiplier during inertial decay
    #[serde(default = "default_friction")]
    pub friction: f64,

    /// Inertia stops once every velocity component is at or below this magnitude
    #[serde(default = "default_velocity_epsilon")]
    pub velocity_epsilon: f64,

    /// Animation frame interval used by the async driver
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Preferred camera facing mode ("environment" or "user")
    #[serde(default = "default_facing_mode")]
    pub facing_mode: String,

    /// Resolution of the built-in test pattern source (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Directory where captured stills are written
    #[serde(default = "default_capture_path")]
    pub path: String,

    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Clamp the crop rectangle to the source frame before rendering
    #[serde(default = "default_clamp_crop")]
    pub clamp_crop: bool,

    /// Save metadata JSON files next to each capture
    #[serde(default = "default_save_metadata")]
    pub save_metadata: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl ViewfinderConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("viewfinder.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("gesture.min_scale", default_min_scale())?
            .set_default("gesture.max_scale", default_max_scale())?
            .set_default("gesture.initial_scale", default_initial_scale())?
            .set_default("gesture.friction", default_friction())?
            .set_default("gesture.velocity_epsilon", default_velocity_epsilon())?
            .set_default("gesture.frame_interval_ms", default_frame_interval_ms() as i64)?
            .set_default("camera.facing_mode", default_facing_mode())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("capture.path", default_capture_path())?
            .set_default("capture.jpeg_quality", default_jpeg_quality() as i64)?
            .set_default("capture.clamp_crop", default_clamp_crop())?
            .set_default("capture.save_metadata", default_save_metadata())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            .add_source(
                Environment::with_prefix("VIEWFINDER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: ViewfinderConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gesture = &self.gesture;

        // Zooming out past the full frame would produce a crop larger than the source
        if !(gesture.min_scale >= 1.0) {
            return Err(ConfigError::Message(
                "Gesture min_scale must be at least 1".to_string(),
            ));
        }

        if !(gesture.max_scale >= 1.0) {
            return Err(ConfigError::Message(
                "Gesture max_scale must be at least 1".to_string(),
            ));
        }

        if !(gesture.max_scale >= gesture.min_scale) {
            return Err(ConfigError::Message(
                "Gesture max_scale must be at least min_scale".to_string(),
            ));
        }

        if !(gesture.min_scale..=gesture.max_scale).contains(&gesture.initial_scale) {
            return Err(ConfigError::Message(format!(
                "Gesture initial_scale {} must lie within [{}, {}]",
                gesture.initial_scale, gesture.min_scale, gesture.max_scale
            )));
        }

        if !(gesture.friction > 0.0 && gesture.friction < 1.0) {
            return Err(ConfigError::Message(
                "Gesture friction must lie strictly between 0 and 1".to_string(),
            ));
        }

        if !(gesture.velocity_epsilon > 0.0) {
            return Err(ConfigError::Message(
                "Gesture velocity_epsilon must be greater than 0".to_string(),
            ));
        }

        if gesture.frame_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Gesture frame_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(ConfigError::Message(
                "Capture jpeg_quality must lie within 1..=100".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ViewfinderConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            camera: CameraConfig {
                facing_mode: default_facing_mode(),
                resolution: default_camera_resolution(),
            },
            capture: CaptureConfig {
                path: default_capture_path(),
                jpeg_quality: default_jpeg_quality(),
                clamp_crop: default_clamp_crop(),
                save_metadata: default_save_metadata(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            initial_scale: default_initial_scale(),
            friction: default_friction(),
            velocity_epsilon: default_velocity_epsilon(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

// Default value functions
fn default_min_scale() -> f64 {
    1.0
}
fn default_max_scale() -> f64 {
    3.0
}
fn default_initial_scale() -> f64 {
    1.0
}
fn default_friction() -> f64 {
    0.95
}
fn default_velocity_epsilon() -> f64 {
    1e-3
}
// Roughly one display frame at 60Hz
fn default_frame_interval_ms() -> u64 {
    16
}

fn default_facing_mode() -> String {
    "environment".to_string()
}
fn default_camera_resolution() -> (u32, u32) {
    (1280, 720)
}

fn default_capture_path() -> String {
    "./captures".to_string()
}
fn default_jpeg_quality() -> u8 {
    90
}
fn default_clamp_crop() -> bool {
    false
}
fn default_save_metadata() -> bool {
    true
}

fn default_event_bus_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ViewfinderConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.gesture.max_scale, 3.0);
        assert_eq!(config.gesture.friction, 0.95);
        assert_eq!(config.camera.facing_mode, "environment");
    }

    #[test]
    fn test_validation_rejects_scale_bounds_below_full_frame() {
        let mut config = ViewfinderConfig::default();
        config.gesture.min_scale = 0.25;
        config.gesture.max_scale = 0.5;
        config.gesture.initial_scale = 0.5;
        assert!(config.validate().is_err());

        config.gesture.min_scale = 0.5;
        config.gesture.max_scale = 3.0;
        config.gesture.initial_scale = 1.0;
        assert!(config.validate().is_err());

        config.gesture.min_scale = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ViewfinderConfig::default();

        // Initial scale above the zoom ceiling
        config.gesture.initial_scale = 3.5;
        assert!(config.validate().is_err());

        config.gesture.initial_scale = 3.0;
        assert!(config.validate().is_ok());

        config.gesture.friction = 1.0;
        assert!(config.validate().is_err());
        config.gesture.friction = 0.95;

        config.capture.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.capture.jpeg_quality = 90;

        config.camera.resolution = (0, 480);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = ViewfinderConfig::load_from_file(&path).unwrap();
        assert_eq!(config, ViewfinderConfig::default());
    }

    #[test]
    fn test_load_from_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewfinder.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[gesture]\ninitial_scale = 3.0\n\n[capture]\njpeg_quality = 75\nclamp_crop = true"
        )
        .unwrap();

        let config = ViewfinderConfig::load_from_file(&path).unwrap();
        assert_eq!(config.gesture.initial_scale, 3.0);
        assert_eq!(config.gesture.max_scale, 3.0);
        assert_eq!(config.capture.jpeg_quality, 75);
        assert!(config.capture.clamp_crop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_serializes_to_toml() {
        let text = toml::to_string_pretty(&ViewfinderConfig::default()).unwrap();
        assert!(text.contains("[gesture]"));
        assert!(text.contains("max_scale = 3.0"));
    }
}
