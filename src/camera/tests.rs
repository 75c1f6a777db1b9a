use super::*;
use crate::error::{CameraError, ViewfinderError};
use image::{Rgb, RgbImage};

#[test]
fn test_facing_mode_parsing() {
    assert_eq!("environment".parse::<FacingMode>(), Ok(FacingMode::Environment));
    assert_eq!(" Rear ".parse::<FacingMode>(), Ok(FacingMode::Environment));
    assert_eq!("user".parse::<FacingMode>(), Ok(FacingMode::User));
    assert!("sideways".parse::<FacingMode>().is_err());
    assert_eq!(FacingMode::Environment.to_string(), "environment");
}

#[test]
fn test_session_acquire_and_release() {
    let mut session = CameraSession::new(TestPatternCamera::new(320, 240), FacingMode::Environment);
    assert!(!session.is_active());
    assert_eq!(session.dimensions(), None);

    assert_eq!(session.acquire().unwrap(), (320, 240));
    assert!(session.is_active());
    assert_eq!(session.backend().open_streams(), 1);

    assert!(session.release());
    assert!(!session.release());
    assert_eq!(session.backend().open_streams(), 0);
}

#[test]
fn test_reacquire_releases_previous_stream() {
    let mut session = CameraSession::new(TestPatternCamera::new(320, 240), FacingMode::Environment);
    session.acquire().unwrap();
    session.acquire().unwrap();
    session.acquire().unwrap();

    assert_eq!(session.backend().acquired_count(), 3);
    assert_eq!(session.backend().released_count(), 2);
    assert_eq!(session.backend().open_streams(), 1);
}

#[test]
fn test_grab_frame_requires_stream() {
    let mut session = CameraSession::new(TestPatternCamera::new(16, 16), FacingMode::User);

    match session.grab_frame() {
        Err(ViewfinderError::Camera(error @ CameraError::NotStarted)) => {
            assert_eq!(error.user_message(), "Error capturing photo. Please try again.");
        }
        other => panic!("Expected NotStarted, got {:?}", other.map(|f| f.dimensions())),
    }

    session.acquire().unwrap();
    let frame = session.grab_frame().unwrap();
    assert_eq!(frame.dimensions(), (16, 16));
    assert_eq!(*frame.get_pixel(0, 0), TestPatternSource::pattern_pixel(16, 16, 0, 0));
    assert_eq!(*frame.get_pixel(15, 8), TestPatternSource::pattern_pixel(16, 16, 15, 8));
}

#[test]
fn test_unavailable_device_reports_user_message() {
    let mut camera = TestPatternCamera::new(16, 16);
    camera.set_available(false);
    let mut session = CameraSession::new(camera, FacingMode::Environment);

    match session.acquire() {
        Err(ViewfinderError::Camera(error @ CameraError::DeviceUnavailable { .. })) => {
            assert_eq!(error.user_message(), "Error accessing camera. Please try again.");
        }
        other => panic!("Expected DeviceUnavailable, got {:?}", other),
    }
    assert!(!session.is_active());
}

#[test]
fn test_zero_sized_source_is_rejected() {
    let mut session = CameraSession::new(TestPatternCamera::new(0, 480), FacingMode::Environment);

    assert!(matches!(
        session.acquire(),
        Err(ViewfinderError::Camera(CameraError::InvalidDimensions { width: 0, height: 480 }))
    ));
    assert_eq!(session.backend().open_streams(), 0);
}

#[test]
fn test_still_image_camera_serves_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sign.png");
    let image = RgbImage::from_pixel(40, 30, Rgb([10, 200, 30]));
    image.save(&path).unwrap();

    let mut session = CameraSession::new(StillImageCamera::new(&path), FacingMode::Environment);
    assert_eq!(session.acquire().unwrap(), (40, 30));
    assert_eq!(session.grab_frame().unwrap(), image);
}

#[test]
fn test_still_image_camera_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = CameraSession::new(
        StillImageCamera::new(dir.path().join("missing.png")),
        FacingMode::Environment,
    );

    assert!(matches!(
        session.acquire(),
        Err(ViewfinderError::Camera(CameraError::DeviceUnavailable { .. }))
    ));
}
