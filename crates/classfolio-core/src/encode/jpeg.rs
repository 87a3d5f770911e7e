//! JPEG encoding for rectangular crops.
//!
//! JPEG has no alpha channel, so transparent pixels (rotated corners) are
//! composited onto white before encoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_rgba, EncodeError};

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (clamped to 1-100)
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for a zero dimension,
/// `EncodeError::InvalidPixelData` for a buffer of the wrong length and
/// `EncodeError::EncodingFailed` if the encoder itself fails.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    let rgb = flatten_onto_white(pixels);
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn flatten_onto_white(pixels: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
    for px in pixels.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &c in &px[..3] {
            let blended = (c as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}
