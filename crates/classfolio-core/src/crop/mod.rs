//! Crop selection state, constraints and hit testing.
//!
//! The selection is an axis-aligned rectangle in display space plus a rotation
//! angle applied to the image content around the selection's center. The circular
//! editor keeps the rectangle square and turns it into a circle at render time.

mod hit;
mod state;

pub use hit::{
    hit_test, resize_cursor_for, rotate_handle_position, CursorHint, HitZone, HANDLE_RADIUS,
    RESIZE_INNER_TOLERANCE, RESIZE_OUTER_TOLERANCE, ROTATE_HANDLE_OFFSET,
};
pub use state::{CropConstraints, CropState, InteractionKind, InteractionMode};

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Which editor variant a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropShape {
    /// Square selection rendered through a circular mask.
    #[default]
    Circle,
    /// Free rectangle resized from its corners.
    Rectangle,
}

/// A corner handle of the rectangular selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Position of this corner on `rect`.
    pub fn of(self, rect: &Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x, rect.y),
            Corner::TopRight => Point::new(rect.right(), rect.y),
            Corner::BottomLeft => Point::new(rect.x, rect.bottom()),
            Corner::BottomRight => Point::new(rect.right(), rect.bottom()),
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Direction from the anchored opposite corner towards this one: +1 right/down, -1 left/up.
    pub(crate) fn signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }
}

/// Clamp that tolerates an inverted range by pinning to `lo`.
#[inline]
pub(crate) fn clamp_within(value: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo {
        lo
    } else {
        value.clamp(lo, hi)
    }
}
