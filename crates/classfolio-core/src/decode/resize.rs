//! Downscaling for preview sources.
//!
//! Preview rendering runs the full crop algorithm against a reduced copy of the
//! original, so the copy is made once when an image loads.

use super::{Bitmap, DecodeError, PreviewFilter};

/// Scale `bitmap` to exactly `width` x `height`.
///
/// # Errors
///
/// Returns `DecodeError::InvalidTarget` for a zero edge and
/// `DecodeError::Malformed` if the bitmap's buffer does not match its size.
pub fn resize(
    bitmap: &Bitmap,
    width: u32,
    height: u32,
    filter: PreviewFilter,
) -> Result<Bitmap, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidTarget { width, height });
    }
    if (bitmap.width, bitmap.height) == (width, height) {
        return Ok(bitmap.clone());
    }

    let Some(rgba) = bitmap.to_rgba_image() else {
        return Err(DecodeError::Malformed(format!(
            "{} bytes for {}x{}",
            bitmap.pixels.len(),
            bitmap.width,
            bitmap.height
        )));
    };
    let scaled = image::imageops::resize(&rgba, width, height, filter.into());
    Ok(Bitmap::from_rgba_image(scaled))
}

/// Shrink so neither edge exceeds `max_edge`. Never upscales.
///
/// # Errors
///
/// Same as [`resize`].
pub fn resize_to_fit(
    bitmap: &Bitmap,
    max_edge: u32,
    filter: PreviewFilter,
) -> Result<Bitmap, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidTarget {
            width: 0,
            height: 0,
        });
    }
    let longest = bitmap.width.max(bitmap.height);
    if longest <= max_edge {
        return Ok(bitmap.clone());
    }

    let (width, height) = shrink_to_edge(bitmap.width, bitmap.height, max_edge);
    resize(bitmap, width, height, filter)
}

/// Dimensions with the longer edge set to `max_edge`, the shorter one scaled
/// and rounded, at least 1.
fn shrink_to_edge(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let scale = |short: u32, long: u32| {
        ((short as f64 * max_edge as f64 / long as f64).round() as u32).max(1)
    };
    if width >= height {
        (max_edge, scale(height, width))
    } else {
        (scale(width, height), max_edge)
    }
}
