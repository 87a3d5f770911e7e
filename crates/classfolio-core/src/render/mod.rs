//! Rendering of the cropped output bitmap and its live preview.
//!
//! # Algorithm
//!
//! 1. Map the display-space selection onto source pixels.
//! 2. Size the canvas: `ceil(max(w, h))` square for the circle, `ceil(w) x ceil(h)`
//!    for the rectangle.
//! 3. Without rotation (`|angle| <= 0.01°`), copy the axis-aligned source region
//!    centered on the selection's center straight into the canvas.
//! 4. With rotation, map every canvas pixel back through
//!    `translate(-cropCenter) · rotate(angle) · translate(canvasCenter)`:
//!    ```text
//!    src_x = crop_cx + dx * cos(θ) + dy * sin(θ)
//!    src_y = crop_cy - dx * sin(θ) + dy * cos(θ)
//!    ```
//!    where `(dx, dy)` is the offset from the canvas center. Content turns around
//!    the selection's own center, and canvas pixels with no source behind them
//!    stay transparent.
//! 5. The circle variant clears everything outside the inscribed circle.

mod mask;
mod sample;

use crate::crop::CropShape;
use crate::decode::Bitmap;
use crate::geometry::{display_to_source, DisplayMetrics, Rect};

use mask::apply_circle_mask;
use sample::{sample_bilinear, sample_nearest};

/// Angles at or below this magnitude render through the unrotated path.
pub const ROTATION_EPSILON: f64 = 0.01;

/// Canvas dimensions for a selection covering `source_rect` source pixels.
pub fn output_dimensions(source_rect: &Rect, shape: CropShape) -> (u32, u32) {
    let w = source_rect.width.max(0.0).ceil().max(1.0) as u32;
    let h = source_rect.height.max(0.0).ceil().max(1.0) as u32;
    match shape {
        CropShape::Circle => {
            let side = w.max(h);
            (side, side)
        }
        CropShape::Rectangle => (w, h),
    }
}

/// Render the final crop at full source resolution.
pub fn render_final_crop(
    source: &Bitmap,
    rect: &Rect,
    rotation: f64,
    metrics: &DisplayMetrics,
    shape: CropShape,
) -> Bitmap {
    let source_rect = display_to_source(rect, metrics, source.size());
    let (out_w, out_h) = output_dimensions(&source_rect, shape);
    let center = source_rect.center();
    let out_cx = out_w as f64 / 2.0;
    let out_cy = out_h as f64 / 2.0;

    let mut pixels = vec![0u8; out_w as usize * out_h as usize * 4];

    if rotation.abs() <= ROTATION_EPSILON {
        // Canvas origin expressed in source coordinates
        let origin_x = center.x - out_cx;
        let origin_y = center.y - out_cy;
        for (idx, chunk) in pixels.chunks_exact_mut(4).enumerate() {
            let x = (idx as u32 % out_w) as f64;
            let y = (idx as u32 / out_w) as f64;
            chunk.copy_from_slice(&sample_nearest(
                source,
                origin_x + x + 0.5,
                origin_y + y + 0.5,
            ));
        }
    } else {
        let theta = rotation.to_radians();
        let (sin, cos) = theta.sin_cos();
        for (idx, chunk) in pixels.chunks_exact_mut(4).enumerate() {
            let dx = (idx as u32 % out_w) as f64 + 0.5 - out_cx;
            let dy = (idx as u32 / out_w) as f64 + 0.5 - out_cy;
            let src_x = center.x + dx * cos + dy * sin;
            let src_y = center.y - dx * sin + dy * cos;
            chunk.copy_from_slice(&sample_bilinear(source, src_x, src_y));
        }
    }

    if shape == CropShape::Circle {
        apply_circle_mask(&mut pixels, out_w);
    }

    Bitmap::new(out_w, out_h, pixels)
}

/// Render a preview of the selection.
///
/// `preview_source` is usually a downscaled copy of the original. Selection
/// geometry lives in display space, so the same rectangle and metrics apply
/// whatever the resolution of the bitmap behind them.
///
/// Returns `None` when there is nothing to show: a non-positive selection or an
/// unmeasured display.
pub fn render_preview(
    preview_source: &Bitmap,
    rect: &Rect,
    rotation: f64,
    metrics: &DisplayMetrics,
    shape: CropShape,
) -> Option<Bitmap> {
    if rect.width <= 0.0 || rect.height <= 0.0 || !metrics.is_measured() || preview_source.is_empty()
    {
        return None;
    }
    Some(render_final_crop(
        preview_source,
        rect,
        rotation,
        metrics,
        shape,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{fit, Point, Size};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    /// Top half red, bottom half blue.
    fn split_image(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for _ in 0..width {
                pixels.extend_from_slice(if y < height / 2 { &RED } else { &BLUE });
            }
        }
        Bitmap::new(width, height, pixels)
    }

    /// Unique value per position in the red channel.
    fn indexed_image(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[((y * width + x) % 256) as u8, 0, 0, 255]);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    fn identity_metrics(width: f64, height: f64) -> DisplayMetrics {
        DisplayMetrics::new(Size::new(width, height), Point::new(0.0, 0.0))
    }

    #[test]
    fn test_full_display_rect_matches_source_size() {
        let source = indexed_image(80, 40);
        let metrics = fit(Size::new(400.0, 300.0), source.size()).unwrap();

        let rect_out = render_final_crop(&source, &metrics.bounds(), 0.0, &metrics, CropShape::Rectangle);
        assert_eq!((rect_out.width, rect_out.height), (80, 40));
        assert_eq!(rect_out.pixels, source.pixels);

        let circle_out = render_final_crop(&source, &metrics.bounds(), 0.0, &metrics, CropShape::Circle);
        assert_eq!((circle_out.width, circle_out.height), (80, 80));
    }

    #[test]
    fn test_unrotated_copies_sub_rectangle() {
        let source = indexed_image(10, 10);
        let metrics = identity_metrics(10.0, 10.0);

        let out = render_final_crop(
            &source,
            &Rect::new(3.0, 3.0, 4.0, 4.0),
            0.0,
            &metrics,
            CropShape::Rectangle,
        );
        assert_eq!((out.width, out.height), (4, 4));
        assert_eq!(out.pixel(0, 0)[0], 33);
        assert_eq!(out.pixel(3, 3)[0], 66);
    }

    #[test]
    fn test_unrotated_scales_display_to_source() {
        // Display is half the source resolution
        let source = indexed_image(20, 20);
        let metrics = identity_metrics(10.0, 10.0);

        let out = render_final_crop(
            &source,
            &Rect::new(1.0, 1.0, 2.0, 2.0),
            0.0,
            &metrics,
            CropShape::Rectangle,
        );
        assert_eq!((out.width, out.height), (4, 4));
        assert_eq!(out.pixel(0, 0)[0], (2 * 20 + 2) as u8);
    }

    #[test]
    fn test_fractional_selection_rounds_canvas_up() {
        let source = indexed_image(10, 10);
        let metrics = identity_metrics(10.0, 10.0);
        let out = render_final_crop(
            &source,
            &Rect::new(1.0, 1.0, 2.2, 3.7),
            0.0,
            &metrics,
            CropShape::Rectangle,
        );
        assert_eq!((out.width, out.height), (3, 4));
    }

    #[test]
    fn test_tiny_rotation_uses_unrotated_path() {
        let source = indexed_image(10, 10);
        let metrics = identity_metrics(10.0, 10.0);
        let rect = Rect::new(2.0, 2.0, 5.0, 5.0);

        let plain = render_final_crop(&source, &rect, 0.0, &metrics, CropShape::Rectangle);
        let tiny = render_final_crop(&source, &rect, 0.005, &metrics, CropShape::Rectangle);
        assert_eq!(plain, tiny);
    }

    #[test]
    fn test_rotation_turns_around_crop_center() {
        let source = split_image(100, 100);
        let metrics = identity_metrics(100.0, 100.0);

        // Quarter turn clockwise: the bottom (blue) half ends up on the left
        let out = render_final_crop(
            &source,
            &metrics.bounds(),
            90.0,
            &metrics,
            CropShape::Rectangle,
        );
        assert_eq!((out.width, out.height), (100, 100));
        assert_eq!(out.pixel(10, 50), BLUE);
        assert_eq!(out.pixel(90, 50), RED);
    }

    #[test]
    fn test_rotation_of_off_center_crop_stays_local() {
        // Crop inside the red half; any rotation about its own center keeps it red
        let source = split_image(100, 100);
        let metrics = identity_metrics(100.0, 100.0);

        let out = render_final_crop(
            &source,
            &Rect::new(30.0, 5.0, 20.0, 20.0),
            45.0,
            &metrics,
            CropShape::Rectangle,
        );
        assert_eq!(out.pixel(10, 10), RED);
        assert_eq!(out.pixel(2, 2), RED);
    }

    #[test]
    fn test_rotation_exposes_transparent_corners_outside_source() {
        let source = split_image(100, 100);
        let metrics = identity_metrics(100.0, 100.0);
        let out = render_final_crop(
            &source,
            &metrics.bounds(),
            45.0,
            &metrics,
            CropShape::Rectangle,
        );
        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(50, 50)[3], 255);
    }

    #[test]
    fn test_circle_output_has_transparent_corners() {
        let source = split_image(64, 64);
        let metrics = identity_metrics(64.0, 64.0);
        let out = render_final_crop(
            &source,
            &Rect::new(16.0, 16.0, 32.0, 32.0),
            0.0,
            &metrics,
            CropShape::Circle,
        );
        assert_eq!((out.width, out.height), (32, 32));
        assert_eq!(out.pixel(0, 0), [0; 4]);
        assert_eq!(out.pixel(31, 31), [0; 4]);
        assert_eq!(out.pixel(16, 8), RED);
        assert_eq!(out.pixel(16, 24), BLUE);
    }

    #[test]
    fn test_preview_rejects_empty_geometry() {
        let source = split_image(10, 10);
        let metrics = identity_metrics(10.0, 10.0);

        assert!(render_preview(&source, &Rect::new(0.0, 0.0, 0.0, 5.0), 0.0, &metrics, CropShape::Circle).is_none());
        assert!(render_preview(
            &source,
            &Rect::new(0.0, 0.0, 5.0, 5.0),
            0.0,
            &identity_metrics(0.0, 10.0),
            CropShape::Circle
        )
        .is_none());
    }

    #[test]
    fn test_preview_on_downscaled_source_keeps_framing() {
        let full = split_image(200, 200);
        let small = split_image(50, 50);
        let metrics = identity_metrics(100.0, 100.0);
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);

        let final_crop = render_final_crop(&full, &rect, 0.0, &metrics, CropShape::Rectangle);
        let preview = render_preview(&small, &rect, 0.0, &metrics, CropShape::Rectangle).unwrap();

        assert_eq!((final_crop.width, preview.width), (200, 50));
        assert_eq!(preview.pixel(25, 10), RED);
        assert_eq!(preview.pixel(25, 40), BLUE);
    }

    #[test]
    fn test_output_dimensions() {
        let r = Rect::new(0.0, 0.0, 10.2, 4.0);
        assert_eq!(output_dimensions(&r, CropShape::Rectangle), (11, 4));
        assert_eq!(output_dimensions(&r, CropShape::Circle), (11, 11));
        assert_eq!(output_dimensions(&Rect::default(), CropShape::Circle), (1, 1));
    }
}
