//! Image decoding for the crop editor.
//!
//! This module provides functionality for:
//! - Decoding original photos (JPEG, PNG) into RGBA bitmaps
//! - Applying EXIF orientation so geometry is computed on upright pixels
//! - Downscaling originals into preview sources
//!
//! Decoding is synchronous; the editor runs it off the UI thread.

mod load;
mod resize;
mod types;

pub use load::{decode_image, read_orientation};
pub use resize::{resize, resize_to_fit};
pub use types::{Bitmap, DecodeError, ExifOrientation, PreviewFilter};
