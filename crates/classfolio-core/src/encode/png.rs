//! PNG encoding, used wherever the crop may carry transparency.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_rgba, EncodeError};

/// Encode RGBA pixel data to PNG bytes, keeping the alpha channel.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for a zero dimension,
/// `EncodeError::InvalidPixelData` for a buffer of the wrong length and
/// `EncodeError::EncodingFailed` if the encoder itself fails.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(out)
}
