//! Display-space geometry for the crop editor.
//!
//! The editor draws a source bitmap inside a container of arbitrary size using a
//! "fit and letterbox" policy: the image is scaled to fit while preserving its
//! aspect ratio and centered on the axis that does not fill the container.
//!
//! # Coordinate Systems
//!
//! - **Display space**: container pixels, origin at the container's top-left corner.
//!   The crop rectangle lives here.
//! - **Source space**: pixels of the loaded bitmap, origin at its top-left corner.
//!
//! [`fit`] maps an image into the container and [`display_to_source`] maps a
//! display-space rectangle back onto source pixels.

use serde::{Deserialize, Serialize};

/// A point in display or source space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle in degrees of the vector from `self` to `other`, as `atan2(dy, dx)`.
    ///
    /// Display space has y pointing down, so increasing angles turn clockwise on screen.
    pub fn angle_to(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

/// A width/height pair in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are positive and finite.
    ///
    /// A container that has not been through a layout pass reports zero here.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// Native pixel dimensions of a loaded source bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImagePixelSize {
    pub width: u32,
    pub height: u32,
}

impl ImagePixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// An axis-aligned rectangle with floating point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when `other` lies entirely inside `self`, allowing `epsilon` of slack.
    pub fn contains_rect(&self, other: &Rect, epsilon: f64) -> bool {
        other.x >= self.x - epsilon
            && other.y >= self.y - epsilon
            && other.right() <= self.right() + epsilon
            && other.bottom() <= self.bottom() + epsilon
    }
}

/// Where a source image is drawn inside its container.
///
/// `size` preserves the source aspect ratio and `offset` centers the image on the
/// axis it does not fill.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub size: Size,
    pub offset: Point,
}

impl DisplayMetrics {
    /// Metrics used while the container has not been measured yet.
    pub const FALLBACK: DisplayMetrics = DisplayMetrics {
        size: Size::new(400.0, 300.0),
        offset: Point::new(100.0, 50.0),
    };

    pub const fn new(size: Size, offset: Point) -> Self {
        Self { size, offset }
    }

    pub fn is_measured(&self) -> bool {
        self.size.is_measured()
    }

    /// The displayed image as a rectangle in container coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.size.width,
            self.size.height,
        )
    }
}

/// Fit an image into a container, preserving aspect ratio and centering it.
///
/// Returns `None` when the container or the image has a zero dimension. A zero
/// container means layout has not run yet; callers fall back to
/// [`DisplayMetrics::FALLBACK`] and recompute once a real size arrives.
pub fn fit(container: Size, image: ImagePixelSize) -> Option<DisplayMetrics> {
    if !container.is_measured() || image.is_empty() {
        return None;
    }

    let image_aspect = image.aspect();
    let container_aspect = container.width / container.height;

    let metrics = if image_aspect > container_aspect {
        // Relatively wider than the container: fill width, letterbox top and bottom
        let height = container.width / image_aspect;
        DisplayMetrics::new(
            Size::new(container.width, height),
            Point::new(0.0, (container.height - height) / 2.0),
        )
    } else {
        // Relatively taller: fill height, pillarbox left and right
        let width = container.height * image_aspect;
        DisplayMetrics::new(
            Size::new(width, container.height),
            Point::new((container.width - width) / 2.0, 0.0),
        )
    };

    Some(metrics)
}

/// Like [`fit`], substituting the fallback metrics for an unmeasured container.
pub fn fit_or_fallback(container: Size, image: ImagePixelSize) -> DisplayMetrics {
    fit(container, image).unwrap_or(DisplayMetrics::FALLBACK)
}

/// Map a display-space rectangle onto source pixels.
///
/// The scale is `source / display` per axis and positions are taken relative to
/// the display offset. The result is clamped to `[0, source size]` so that reads
/// from the source bitmap never go out of bounds.
pub fn display_to_source(rect: &Rect, metrics: &DisplayMetrics, source: ImagePixelSize) -> Rect {
    if !metrics.is_measured() || source.is_empty() {
        return Rect::default();
    }

    let src_w = source.width as f64;
    let src_h = source.height as f64;
    let scale_x = src_w / metrics.size.width;
    let scale_y = src_h / metrics.size.height;

    let left = ((rect.x - metrics.offset.x) * scale_x).clamp(0.0, src_w);
    let top = ((rect.y - metrics.offset.y) * scale_y).clamp(0.0, src_h);
    let right = ((rect.right() - metrics.offset.x) * scale_x).clamp(left, src_w);
    let bottom = ((rect.bottom() - metrics.offset.y) * scale_y).clamp(top, src_h);

    Rect::new(left, top, right - left, bottom - top)
}

/// Map a source pixel coordinate to display space.
pub fn source_to_display(point: Point, metrics: &DisplayMetrics, source: ImagePixelSize) -> Point {
    if source.is_empty() {
        return metrics.offset;
    }
    Point::new(
        metrics.offset.x + point.x * metrics.size.width / source.width as f64,
        metrics.offset.y + point.y * metrics.size.height / source.height as f64,
    )
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees % 360.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn container_strategy() -> impl Strategy<Value = Size> {
        (1.0f64..=4000.0, 1.0f64..=4000.0).prop_map(|(w, h)| Size::new(w, h))
    }

    fn image_strategy() -> impl Strategy<Value = ImagePixelSize> {
        (1u32..=8000, 1u32..=8000).prop_map(|(w, h)| ImagePixelSize::new(w, h))
    }

    /// Smallest distance between two angles on the circle.
    fn circular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).abs() % 360.0;
        d.min(360.0 - d)
    }

    proptest! {
        /// Property: fitted size keeps the image aspect and stays inside the container.
        #[test]
        fn prop_fit_preserves_aspect_and_fits(
            container in container_strategy(),
            image in image_strategy(),
        ) {
            let m = fit(container, image).unwrap();

            let display_aspect = m.size.width / m.size.height;
            let rel_err = (display_aspect - image.aspect()).abs() / image.aspect();
            prop_assert!(rel_err < 1e-9, "aspect drifted by {}", rel_err);

            let eps = 1e-9 * container.width.max(container.height);
            prop_assert!(m.offset.x >= -eps && m.offset.y >= -eps);
            prop_assert!(m.offset.x + m.size.width <= container.width + eps);
            prop_assert!(m.offset.y + m.size.height <= container.height + eps);
        }

        /// Property: the image is centered on the non-fitted axis.
        #[test]
        fn prop_fit_centers(
            container in container_strategy(),
            image in image_strategy(),
        ) {
            let m = fit(container, image).unwrap();
            let left_gap = m.offset.x;
            let right_gap = container.width - m.offset.x - m.size.width;
            let top_gap = m.offset.y;
            let bottom_gap = container.height - m.offset.y - m.size.height;

            prop_assert!((left_gap - right_gap).abs() < 1e-6);
            prop_assert!((top_gap - bottom_gap).abs() < 1e-6);
        }

        /// Property: mapped source rectangles never leave the bitmap.
        #[test]
        fn prop_display_to_source_in_bounds(
            container in container_strategy(),
            image in image_strategy(),
            (x, y, w, h) in (-500.0f64..4500.0, -500.0f64..4500.0, 0.0f64..5000.0, 0.0f64..5000.0),
        ) {
            let m = fit(container, image).unwrap();
            let r = display_to_source(&Rect::new(x, y, w, h), &m, image);

            prop_assert!(r.x >= 0.0 && r.y >= 0.0);
            prop_assert!(r.width >= 0.0 && r.height >= 0.0);
            prop_assert!(r.right() <= image.width as f64);
            prop_assert!(r.bottom() <= image.height as f64);
        }

        /// Property: normalized angles land in (-180, 180].
        #[test]
        fn prop_normalize_in_range(angle in -100_000.0f64..100_000.0) {
            let n = normalize_angle(angle);
            prop_assert!(n > -180.0 && n <= 180.0, "{} normalized to {}", angle, n);
        }

        /// Property: normalizing an in-range angle is a no-op.
        #[test]
        fn prop_normalize_idempotent(angle in -179.999f64..=180.0) {
            prop_assert_eq!(normalize_angle(angle), angle);
        }

        /// Property: whole turns do not change the normalized angle.
        #[test]
        fn prop_normalize_periodic(angle in -1000.0f64..1000.0, k in -5i32..=5) {
            let a = normalize_angle(angle);
            let b = normalize_angle(angle + 360.0 * k as f64);
            prop_assert!(circular_distance(a, b) < 1e-9, "{} vs {}", a, b);
        }
    }
}
