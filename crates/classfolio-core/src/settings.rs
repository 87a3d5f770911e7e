//! Persisted crop geometry and its re-projection onto a resized display.
//!
//! A [`CropSettings`] record stores the selection together with the display
//! metrics that were in effect when it was captured. Restoring it against the
//! metrics that apply now rescales the selection so it covers the same part of
//! the image, whatever the window size.
//!
//! # Wire Format
//!
//! A flat JSON object with exactly these fields:
//!
//! ```text
//! { "x", "y", "width", "height", "rotationAngle",
//!   "imageDisplayWidth", "imageDisplayHeight",
//!   "imageDisplayOffsetX", "imageDisplayOffsetY" }
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::{DisplayMetrics, Rect};

/// Snapshot of a selection and the display metrics it was made against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CropSettings {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation_angle: f64,
    pub image_display_width: f64,
    pub image_display_height: f64,
    pub image_display_offset_x: f64,
    pub image_display_offset_y: f64,
}

/// A selection re-projected onto the current display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoredCrop {
    pub rect: Rect,
    pub rotation: f64,
}

impl CropSettings {
    /// Record `rect` and `rotation` with the metrics they were made against.
    pub fn capture(rect: &Rect, rotation: f64, metrics: &DisplayMetrics) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rotation_angle: rotation,
            image_display_width: metrics.size.width,
            image_display_height: metrics.size.height,
            image_display_offset_x: metrics.offset.x,
            image_display_offset_y: metrics.offset.y,
        }
    }

    /// Parse the JSON wire format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the JSON wire format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// True when every field is a finite number and the size is positive.
    pub fn is_well_formed(&self) -> bool {
        let fields = [
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation_angle,
            self.image_display_width,
            self.image_display_height,
            self.image_display_offset_x,
            self.image_display_offset_y,
        ];
        fields.iter().all(|v| v.is_finite()) && self.width > 0.0 && self.height > 0.0
    }

    /// Re-project onto `current` display metrics.
    ///
    /// Returns `None` while `current` is unmeasured (zero width or height); the
    /// caller keeps the settings pending and retries after the next layout pass.
    /// Malformed records also yield `None` so the editor falls back to its default
    /// selection.
    ///
    /// The saved position is taken relative to its own saved offset, scaled by
    /// `current / saved` display size (1.0 on an axis whose saved size was zero),
    /// and placed against the current offset. Size is clamped to
    /// `[1, current display size]` and position so the rectangle stays on the
    /// displayed image. Rotation passes through unchanged.
    pub fn restore(&self, current: &DisplayMetrics) -> Option<RestoredCrop> {
        if !current.is_measured() || !self.is_well_formed() {
            return None;
        }

        let scale_x = if self.image_display_width > 0.0 {
            current.size.width / self.image_display_width
        } else {
            1.0
        };
        let scale_y = if self.image_display_height > 0.0 {
            current.size.height / self.image_display_height
        } else {
            1.0
        };

        let rel_x = self.x - self.image_display_offset_x;
        let rel_y = self.y - self.image_display_offset_y;

        let width = (self.width * scale_x).clamp(1.0, current.size.width.max(1.0));
        let height = (self.height * scale_y).clamp(1.0, current.size.height.max(1.0));

        let b = current.bounds();
        let x = (current.offset.x + rel_x * scale_x).clamp(b.x, (b.right() - width).max(b.x));
        let y = (current.offset.y + rel_y * scale_y).clamp(b.y, (b.bottom() - height).max(b.y));

        Some(RestoredCrop {
            rect: Rect::new(x, y, width, height),
            rotation: self.rotation_angle,
        })
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::geometry::{Point, Size};
    use proptest::prelude::*;

    /// Display metrics plus a rectangle lying inside them.
    fn metrics_and_rect() -> impl Strategy<Value = (DisplayMetrics, Rect)> {
        (
            10.0f64..2000.0,
            10.0f64..2000.0,
            0.0f64..500.0,
            0.0f64..500.0,
            0.0f64..1.0,
            0.0f64..1.0,
            0.05f64..1.0,
            0.05f64..1.0,
        )
            .prop_map(|(w, h, ox, oy, fx, fy, fw, fh)| {
                let m = DisplayMetrics::new(Size::new(w, h), Point::new(ox, oy));
                let rw = (w * fw).max(1.0);
                let rh = (h * fh).max(1.0);
                let rect = Rect::new(ox + (w - rw) * fx, oy + (h - rh) * fy, rw, rh);
                (m, rect)
            })
    }

    proptest! {
        /// Property: restoring against the same metrics returns the original selection.
        #[test]
        fn prop_round_trip_restore(
            (m, rect) in metrics_and_rect(),
            rotation in -179.9f64..=180.0,
        ) {
            let restored = CropSettings::capture(&rect, rotation, &m).restore(&m).unwrap();
            let r = restored.rect;
            let eps = 1e-9 * m.size.width.max(m.size.height).max(m.offset.x).max(m.offset.y);

            prop_assert!((r.x - rect.x).abs() <= eps, "{} vs {}", r.x, rect.x);
            prop_assert!((r.y - rect.y).abs() <= eps);
            prop_assert!((r.width - rect.width).abs() <= eps);
            prop_assert!((r.height - rect.height).abs() <= eps);
            prop_assert_eq!(restored.rotation, rotation);
        }

        /// Property: doubling the display doubles size and offset-relative position.
        #[test]
        fn prop_rescaled_restore_doubles(
            (a, rect) in metrics_and_rect(),
            (ox, oy) in (0.0f64..500.0, 0.0f64..500.0),
        ) {
            let b = DisplayMetrics::new(
                Size::new(a.size.width * 2.0, a.size.height * 2.0),
                Point::new(ox, oy),
            );
            let r = CropSettings::capture(&rect, 0.0, &a).restore(&b).unwrap().rect;
            let eps = 1e-9 * (b.size.width.max(b.size.height) + ox.max(oy) + a.offset.x.max(a.offset.y));

            prop_assert!((r.width - rect.width * 2.0).abs() <= eps);
            prop_assert!((r.height - rect.height * 2.0).abs() <= eps);
            prop_assert!(((r.x - b.offset.x) - (rect.x - a.offset.x) * 2.0).abs() <= eps);
            prop_assert!(((r.y - b.offset.y) - (rect.y - a.offset.y) * 2.0).abs() <= eps);
        }

        /// Property: restored selections always lie on the current display.
        #[test]
        fn prop_restore_stays_in_bounds(
            (a, rect) in metrics_and_rect(),
            (w, h, ox, oy) in (1.0f64..3000.0, 1.0f64..3000.0, 0.0f64..300.0, 0.0f64..300.0),
        ) {
            let now = DisplayMetrics::new(Size::new(w, h), Point::new(ox, oy));
            let r = CropSettings::capture(&rect, 0.0, &a).restore(&now).unwrap().rect;
            prop_assert!(now.bounds().contains_rect(&r, 1e-6));
            prop_assert!(r.width >= 1.0 && r.height >= 1.0);
        }
    }
}
