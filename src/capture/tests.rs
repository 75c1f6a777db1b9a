use super::*;
use crate::config::{CaptureConfig, GestureConfig};
use crate::error::{CaptureError, ViewfinderError};
use crate::gesture::{FrameQueue, GestureEngine, TouchPoint, TransformState, Velocity};
use image::{Rgb, RgbImage};

fn create_test_capture_config(path: &std::path::Path) -> CaptureConfig {
    CaptureConfig {
        path: path.display().to_string(),
        jpeg_quality: 85,
        clamp_crop: false,
        save_metadata: true,
    }
}

/// Left half red, right half blue
fn two_tone_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    })
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_crop_at_double_zoom_is_center_half() {
    let crop = compute_crop_rect(1000, 1000, 2.0, 0.0, 0.0);
    assert_eq!(crop, CropRect::new(250.0, 250.0, 500.0, 500.0));
}

#[test]
fn test_crop_without_zoom_is_full_frame() {
    let crop = compute_crop_rect(1000, 1000, 1.0, 0.0, 0.0);
    assert_eq!(crop, CropRect::new(0.0, 0.0, 1000.0, 1000.0));
    assert_eq!(crop, CropRect::full(1000, 1000));
}

#[test]
fn test_translation_moves_crop_opposite_to_pan() {
    let crop = compute_crop_rect(1000, 1000, 2.0, 100.0, -50.0);
    assert_eq!(crop, CropRect::new(150.0, 300.0, 500.0, 500.0));
}

#[test]
fn test_crop_is_never_degenerate_within_scale_bounds() {
    for step in 0..=20 {
        let scale = 1.0 + step as f64 * 0.1;
        let crop = compute_crop_rect(1920, 1080, scale, 0.0, 0.0);

        assert!(!crop.is_degenerate(), "degenerate crop at scale {}", scale);
        assert!(crop.is_within(1920, 1080));
        assert_close(crop.width * scale, 1920.0);
    }
}

#[test]
fn test_crop_is_unclamped() {
    let crop = compute_crop_rect(1000, 1000, 2.0, 400.0, 0.0);
    assert_eq!(crop.x, -150.0);
    assert!(!crop.is_within(1000, 1000));
}

#[test]
fn test_max_zoom_with_max_pan_touches_source_edge() {
    let mut engine = GestureEngine::new(GestureConfig::default(), FrameQueue::new());
    engine.set_viewport(1000.0, 1000.0);

    engine.touch_start(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(100.0, 0.0)]);
    engine.touch_move(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(400.0, 0.0)]);
    engine.freeze();
    engine.fling(Velocity::new(0.0, 1e6, -1e6));
    engine.advance_frame();

    let state = engine.state();
    assert_eq!(state.scale, 3.0);

    let crop = map_viewport_to_source(&state, (1000, 1000), (1000.0, 1000.0));
    assert_eq!(crop.x, 0.0);
    assert_close(crop.bottom(), 1000.0);
    assert!(!crop.is_degenerate());
}

#[test]
fn test_viewport_translation_is_rescaled_to_source() {
    let state = TransformState::new(2.0, 50.0, 25.0);
    let crop = map_viewport_to_source(&state, (2000, 1000), (500.0, 250.0));

    assert_eq!(crop, CropRect::new(300.0, 150.0, 1000.0, 500.0));
}

#[test]
fn test_viewport_matching_source_is_identity_mapping() {
    let state = TransformState::new(2.5, -12.0, 30.0);
    let mapped = map_viewport_to_source(&state, (800, 600), (800.0, 600.0));

    assert_eq!(mapped, compute_crop_rect(800, 600, 2.5, -12.0, 30.0));
}

#[test]
fn test_clamped_to_shifts_back_inside() {
    let crop = CropRect::new(-20.0, 950.0, 500.0, 100.0).clamped_to(1000, 1000);
    assert_eq!(crop, CropRect::new(0.0, 900.0, 500.0, 100.0));

    let oversized = CropRect::new(-10.0, -10.0, 2000.0, 50.0).clamped_to(1000, 1000);
    assert_eq!(oversized, CropRect::new(0.0, 0.0, 1000.0, 50.0));
}

#[test]
fn test_render_full_frame_is_unchanged() {
    let source = two_tone_frame(64, 32);
    let rendered = render_crop(&source, &CropRect::full(64, 32)).unwrap();

    assert_eq!(rendered, source);
}

#[test]
fn test_render_zoomed_region_fills_output() {
    let source = two_tone_frame(200, 100);
    let crop = compute_crop_rect(200, 100, 2.0, 0.0, 0.0);
    let rendered = render_crop(&source, &crop).unwrap();

    assert_eq!(rendered.dimensions(), (200, 100));

    let left = rendered.get_pixel(20, 50);
    assert!(left[0] > 250 && left[2] < 5, "expected red, got {:?}", left);

    let right = rendered.get_pixel(180, 50);
    assert!(right[2] > 250 && right[0] < 5, "expected blue, got {:?}", right);
}

#[test]
fn test_render_follows_fractional_crop() {
    // Red equals the column index, so the expected value is linear in x
    let source = RgbImage::from_fn(250, 10, |x, _| Rgb([x as u8, 0, 0]));
    let crop = compute_crop_rect(250, 10, 3.0, 0.0, 0.0);
    assert!(crop.x.fract() != 0.0 && crop.width.fract() != 0.0);

    let rendered = render_crop(&source, &crop).unwrap();
    let x_ratio = crop.width / 250.0;

    for dst_x in 0..250 {
        let expected = crop.x + (dst_x as f64 + 0.5) * x_ratio - 0.5;
        let actual = rendered.get_pixel(dst_x, 5)[0] as f64;
        assert!(
            (actual - expected).abs() <= 0.5 + 1e-9,
            "column {}: expected {:.3}, got {}",
            dst_x,
            expected,
            actual
        );
    }
}

#[test]
fn test_render_fills_overflow_with_black() {
    let source = two_tone_frame(200, 100);
    let crop = compute_crop_rect(200, 100, 2.0, 75.0, 0.0);
    assert_eq!(crop.x, -25.0);

    let rendered = render_crop(&source, &crop).unwrap();
    assert_eq!(*rendered.get_pixel(10, 50), Rgb([0, 0, 0]));
    assert_eq!(*rendered.get_pixel(180, 50), Rgb([255, 0, 0]));
}

#[test]
fn test_render_rejects_crop_outside_source() {
    let source = two_tone_frame(200, 100);
    let crop = CropRect::new(-300.0, 0.0, 100.0, 50.0);

    match render_crop(&source, &crop) {
        Err(ViewfinderError::Capture(CaptureError::EmptyCrop { .. })) => {}
        other => panic!("Expected EmptyCrop, got {:?}", other.map(|img| img.dimensions())),
    }
}

#[test]
fn test_render_rejects_degenerate_crop() {
    let source = two_tone_frame(200, 100);
    let crop = CropRect::new(10.0, 10.0, 0.0, 50.0);

    assert!(matches!(
        render_crop(&source, &crop),
        Err(ViewfinderError::Capture(CaptureError::EmptyCrop { .. }))
    ));
}

#[test]
fn test_encode_jpeg_produces_decodable_image() {
    let source = two_tone_frame(120, 80);
    let jpeg = encode_jpeg(&source, 90).unwrap();

    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (120, 80));
}

#[test]
fn test_capture_frame_id_format() {
    let frame = CaptureFrame::new(
        (1000, 1000),
        (1000.0, 1000.0),
        TransformState::centered(2.0),
        CropRect::new(250.0, 250.0, 500.0, 500.0),
    );

    // e.g. 20240101_120000_123
    assert_eq!(frame.id.len(), 19);
    assert_eq!(frame.image_file_name(), format!("{}.jpg", frame.id));
}

#[tokio::test]
async fn test_save_capture_writes_image_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_capture_config(&dir.path().join("captures"));

    let frame = CaptureFrame::new(
        (1000, 1000),
        (1000.0, 1000.0),
        TransformState::centered(2.0),
        CropRect::new(250.0, 250.0, 500.0, 500.0),
    );
    let jpeg = encode_jpeg(&two_tone_frame(32, 32), 80).unwrap();

    let saved = save_capture(&frame, &jpeg, &config).await.unwrap();
    assert_eq!(std::fs::read(&saved.image_path).unwrap(), jpeg);

    let metadata_path = saved.metadata_path.expect("metadata enabled");
    let json = std::fs::read_to_string(metadata_path).unwrap();
    let restored: CaptureFrame = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, frame);
}

#[tokio::test]
async fn test_save_capture_without_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_capture_config(dir.path());
    config.save_metadata = false;

    let frame = CaptureFrame::new(
        (64, 64),
        (64.0, 64.0),
        TransformState::identity(),
        CropRect::full(64, 64),
    );

    let saved = save_capture(&frame, &[0xFF, 0xD8, 0xFF, 0xD9], &config)
        .await
        .unwrap();
    assert!(saved.image_path.exists());
    assert!(saved.metadata_path.is_none());
    assert!(!dir.path().join("metadata").exists());
}
