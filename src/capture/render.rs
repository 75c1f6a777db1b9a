use crate::error::{CaptureError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgb, RgbImage};
use tracing::debug;

use super::crop::CropRect;

/// Draw `crop` from `source` stretched to the source dimensions.
///
/// Sampling follows the fractional rectangle exactly, without snapping it
/// to whole pixels. Parts of the rectangle that fall outside the source are
/// rendered black.
pub fn render_crop(source: &RgbImage, crop: &CropRect) -> Result<RgbImage> {
    let (width, height) = source.dimensions();

    if crop.is_degenerate() {
        return Err(CaptureError::EmptyCrop {
            details: format!("{}x{} rectangle", crop.width, crop.height),
        }
        .into());
    }

    if crop.right() <= 0.0
        || crop.bottom() <= 0.0
        || crop.x >= width as f64
        || crop.y >= height as f64
    {
        return Err(CaptureError::EmptyCrop {
            details: format!(
                "({:.1}, {:.1}) {:.1}x{:.1} lies outside {}x{}",
                crop.x, crop.y, crop.width, crop.height, width, height
            ),
        }
        .into());
    }

    if !crop.is_within(width, height) {
        debug!(
            "Crop extends past the {}x{} source, filling the overflow",
            width, height
        );
    }

    if *crop == CropRect::full(width, height) {
        return Ok(source.clone());
    }

    Ok(resample(source, crop))
}

/// Bilinear resample of the fractional `crop` onto a source-sized canvas,
/// black where the rectangle leaves the source
fn resample(source: &RgbImage, crop: &CropRect) -> RgbImage {
    let (width, height) = source.dimensions();
    let x_ratio = crop.width / width as f64;
    let y_ratio = crop.height / height as f64;

    RgbImage::from_fn(width, height, |dst_x, dst_y| {
        let src_x = crop.x + (dst_x as f64 + 0.5) * x_ratio;
        let src_y = crop.y + (dst_y as f64 + 0.5) * y_ratio;

        if src_x < 0.0 || src_y < 0.0 || src_x >= width as f64 || src_y >= height as f64 {
            Rgb([0, 0, 0])
        } else {
            sample_bilinear(source, src_x - 0.5, src_y - 0.5)
        }
    })
}

/// Interpolate at (`x`, `y`) in pixel-center coordinates, clamped to the edge
fn sample_bilinear(source: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (width, height) = source.dimensions();
    let x = x.clamp(0.0, (width - 1) as f64);
    let y = y.clamp(0.0, (height - 1) as f64);

    let (x0, y0) = (x.floor() as u32, y.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(width - 1), (y0 + 1).min(height - 1));
    let (fx, fy) = (x - x0 as f64, y - y0 as f64);

    let top_left = source.get_pixel(x0, y0);
    let top_right = source.get_pixel(x1, y0);
    let bottom_left = source.get_pixel(x0, y1);
    let bottom_right = source.get_pixel(x1, y1);

    let mut pixel = [0u8; 3];
    for (channel, value) in pixel.iter_mut().enumerate() {
        let top = top_left[channel] as f64 * (1.0 - fx) + top_right[channel] as f64 * fx;
        let bottom = bottom_left[channel] as f64 * (1.0 - fx) + bottom_right[channel] as f64 * fx;
        *value = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(pixel)
}

/// Encode an RGB image as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));

    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgb8,
        )
        .map_err(|e| CaptureError::Encoding {
            details: e.to_string(),
        })?;

    debug!(
        "Encoded {}x{} still at quality {} ({} bytes)",
        image.width(),
        image.height(),
        quality,
        output.len()
    );
    Ok(output)
}
