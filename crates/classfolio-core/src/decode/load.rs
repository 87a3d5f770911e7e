//! Decoding of original photos.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;

use super::{Bitmap, DecodeError, ExifOrientation};

/// Decode a JPEG or PNG into an upright RGBA bitmap.
///
/// The format is sniffed from the content. Phone cameras store portraits as
/// landscape frames plus an orientation tag; the tag is applied here so display
/// geometry is always computed from upright pixel sizes.
///
/// # Errors
///
/// Returns `DecodeError::Unsupported` for unknown formats,
/// `DecodeError::Malformed` if decoding fails and `DecodeError::Empty` for a
/// zero-sized image.
pub fn decode_image(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::Unsupported);
    }
    let frame = reader
        .decode()
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let upright = read_orientation(bytes).apply(frame);
    let bitmap = Bitmap::from_rgba_image(upright.into_rgba8());
    if bitmap.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(bitmap)
}

/// Orientation tag of the primary image; upright when absent or unreadable.
pub fn read_orientation(bytes: &[u8]) -> ExifOrientation {
    let Ok(exif) = Reader::new().read_from_container(&mut Cursor::new(bytes)) else {
        return ExifOrientation::UPRIGHT;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(ExifOrientation::from_tag)
        .unwrap_or(ExifOrientation::UPRIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    #[test]
    fn test_decode_png() {
        let bitmap = decode_image(&png_bytes(6, 4)).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (6, 4));
        assert_eq!(bitmap.pixel(5, 3), [5, 3, 7, 255]);
    }

    #[test]
    fn test_unknown_bytes_are_unsupported() {
        let result = decode_image(b"definitely not an image");
        assert!(matches!(result, Err(DecodeError::Unsupported)));
    }

    #[test]
    fn test_truncated_png_is_malformed() {
        let mut bytes = png_bytes(16, 16);
        bytes.truncate(40);
        assert!(matches!(decode_image(&bytes), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_png_without_exif_is_upright() {
        assert_eq!(read_orientation(&png_bytes(2, 2)), ExifOrientation::UPRIGHT);
    }
}
