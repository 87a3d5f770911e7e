//! Encoding of the final crop for saving.
//!
//! This module provides functionality for:
//! - Encoding RGBA bitmaps to JPEG (alpha flattened onto white)
//! - Encoding RGBA bitmaps to PNG (alpha preserved)
//! - Choosing the output format from the crop shape and the save path
//!
//! The circular crop always goes out as PNG so its transparent corners
//! survive. The rectangular crop follows the extension of the save path.

mod jpeg;
mod png;

use std::path::Path;

use thiserror::Error;

use crate::crop::CropShape;
use crate::decode::Bitmap;

pub use self::jpeg::encode_jpeg;
pub use self::png::encode_png;

/// Errors that can occur while encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// File format for a saved crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// Pick the format for saving `shape` to `path`.
    ///
    /// Circles are always PNG. Rectangles are JPEG for `.jpg`/`.jpeg` paths
    /// (case-insensitive) and PNG otherwise.
    pub fn for_path(path: &Path, shape: CropShape, jpeg_quality: u8) -> Self {
        if shape == CropShape::Circle {
            return OutputFormat::Png;
        }
        let is_jpeg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
            .unwrap_or(false);
        if is_jpeg {
            OutputFormat::Jpeg {
                quality: jpeg_quality,
            }
        } else {
            OutputFormat::Png
        }
    }
}

/// Encode a bitmap in the given format.
pub fn encode_bitmap(bitmap: &Bitmap, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Png => encode_png(&bitmap.pixels, bitmap.width, bitmap.height),
        OutputFormat::Jpeg { quality } => {
            encode_jpeg(&bitmap.pixels, bitmap.width, bitmap.height, quality)
        }
    }
}

/// Validate an RGBA buffer against its dimensions.
fn check_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
