//! Pixel buffers and decode errors.

use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::ImagePixelSize;

/// Why an original could not be turned into a bitmap.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a JPEG or PNG.
    #[error("unsupported image format")]
    Unsupported,

    #[error("malformed image data: {0}")]
    Malformed(String),

    /// Decoded, but zero-sized.
    #[error("image has no pixels")]
    Empty,

    /// A resize target with a zero edge.
    #[error("invalid target size {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },
}

/// Resampling used when building preview sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<PreviewFilter> for FilterType {
    fn from(filter: PreviewFilter) -> Self {
        match filter {
            PreviewFilter::Nearest => FilterType::Nearest,
            PreviewFilter::Triangle => FilterType::Triangle,
            PreviewFilter::CatmullRom => FilterType::CatmullRom,
            PreviewFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation tag (1-8). Anything else reads as upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExifOrientation(u8);

impl ExifOrientation {
    pub const UPRIGHT: Self = Self(1);

    pub fn from_tag(value: u32) -> Self {
        match value {
            1..=8 => Self(value as u8),
            _ => Self::UPRIGHT,
        }
    }

    pub fn tag(self) -> u8 {
        self.0.max(1)
    }

    /// The stored frame is a quarter turn away from upright, so its width and
    /// height swap once corrected.
    pub fn is_quarter_turn(self) -> bool {
        self.tag() >= 5
    }

    /// Turn a decoded frame upright.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self.tag() {
            2 => img.fliph(),
            3 => img.rotate180(),
            4 => img.flipv(),
            5 => img.rotate90().fliph(),
            6 => img.rotate90(),
            7 => img.rotate270().fliph(),
            8 => img.rotate270(),
            _ => img,
        }
    }
}

/// Straight-alpha RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), rgba_len(width, height));
        Bitmap {
            width,
            height,
            pixels,
        }
    }

    /// All pixels transparent black.
    pub fn transparent(width: u32, height: u32) -> Self {
        Bitmap::new(width, height, vec![0; rgba_len(width, height)])
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(rgba_len(width, height));
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgba);
        }
        Bitmap::new(width, height, pixels)
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (w, h) = (img.width(), img.height());
        Bitmap::new(w, h, img.into_raw())
    }

    /// `None` if the buffer length does not match the dimensions.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn size(&self) -> ImagePixelSize {
        ImagePixelSize::new(self.width, self.height)
    }

    /// Pixel at `(x, y)`; outside the bitmap reads as transparent.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[i..i + 4]);
        out
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty() || self.width == 0 || self.height == 0
    }
}

fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_orientation_tag_range() {
        assert_eq!(ExifOrientation::from_tag(6).tag(), 6);
        assert_eq!(ExifOrientation::from_tag(0), ExifOrientation::UPRIGHT);
        assert_eq!(ExifOrientation::from_tag(42), ExifOrientation::UPRIGHT);
        assert_eq!(ExifOrientation::default().tag(), 1);
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(6, 4));
        for tag in 1..=8 {
            let orientation = ExifOrientation::from_tag(tag);
            let out = orientation.apply(img.clone());
            let expected = if orientation.is_quarter_turn() { (4, 6) } else { (6, 4) };
            assert_eq!((out.width(), out.height()), expected, "tag {tag}");
        }
    }

    #[test]
    fn test_tag_6_turns_clockwise() {
        // Top-left of the stored frame ends up top-right
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let out = ExifOrientation::from_tag(6)
            .apply(DynamicImage::ImageRgba8(img))
            .into_rgba8();
        assert_eq!(out.dimensions(), (1, 2));
        assert_eq!(out.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_preview_filter_serde() {
        let filter: PreviewFilter = serde_json::from_str("\"catmull_rom\"").unwrap();
        assert_eq!(filter, PreviewFilter::CatmullRom);
        assert_eq!(FilterType::from(PreviewFilter::default()), FilterType::Triangle);
    }

    #[test]
    fn test_bitmap_pixels() {
        let bmp = Bitmap::filled(3, 2, [1, 2, 3, 255]);
        assert_eq!(bmp.byte_size(), 24);
        assert_eq!(bmp.pixel(2, 1), [1, 2, 3, 255]);
        assert_eq!(bmp.pixel(3, 0), [0; 4]);
        assert_eq!(bmp.size(), ImagePixelSize::new(3, 2));
        assert!(Bitmap::transparent(0, 0).is_empty());
    }

    #[test]
    fn test_bitmap_converts_to_image_and_back() {
        let bmp = Bitmap::filled(4, 4, [10, 20, 30, 40]);
        let img = bmp.to_rgba_image().unwrap();
        assert_eq!(Bitmap::from_rgba_image(img), bmp);
    }
}
