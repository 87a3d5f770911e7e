//! Hit testing of pointer presses against the selection and its handles.

use super::{Corner, CropShape};
use crate::geometry::{normalize_angle, Point, Rect};

/// How far inside the circle's boundary a press still counts as a resize.
pub const RESIZE_INNER_TOLERANCE: f64 = 20.0;
/// How far outside the circle's boundary a press still counts as a resize.
pub const RESIZE_OUTER_TOLERANCE: f64 = 10.0;
/// Hit radius of corner and rotate handles.
pub const HANDLE_RADIUS: f64 = 10.0;
/// Distance of the rotate handle above the selection's top edge.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;

/// What a pointer position is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    /// Nothing interactive.
    None,
    /// Inside the selection: pressing starts a drag.
    Inside,
    /// On the circle's resize annulus.
    ResizeEdge,
    /// On a rectangle corner handle.
    Corner(Corner),
    /// On the rotate handle.
    RotateHandle,
}

/// Pointer cursor to show for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Move,
    /// West-east arrows.
    ResizeHorizontal,
    /// North-south arrows.
    ResizeVertical,
    /// North-west to south-east arrows.
    ResizeDiagonalDown,
    /// North-east to south-west arrows.
    ResizeDiagonalUp,
    Rotate,
}

impl HitZone {
    /// Cursor for hovering or dragging this zone at `pointer`.
    pub fn cursor(self, rect: &Rect, pointer: Point) -> CursorHint {
        match self {
            HitZone::None => CursorHint::Default,
            HitZone::Inside => CursorHint::Move,
            HitZone::ResizeEdge | HitZone::Corner(_) => resize_cursor_for(rect.center(), pointer),
            HitZone::RotateHandle => CursorHint::Rotate,
        }
    }
}

/// Resize cursor oriented along the line from `center` to `pointer`.
pub fn resize_cursor_for(center: Point, pointer: Point) -> CursorHint {
    // Opposite directions share a cursor, so fold onto [0, 180)
    let angle = center.angle_to(pointer).rem_euclid(180.0);
    if !(22.5..157.5).contains(&angle) {
        CursorHint::ResizeHorizontal
    } else if angle < 67.5 {
        // y grows downwards: 45° points to the lower right
        CursorHint::ResizeDiagonalDown
    } else if angle < 112.5 {
        CursorHint::ResizeVertical
    } else {
        CursorHint::ResizeDiagonalUp
    }
}

/// Center of the rotate handle, above the top edge and turned with the content.
pub fn rotate_handle_position(rect: &Rect, rotation: f64) -> Point {
    let center = rect.center();
    let reach = rect.height / 2.0 + ROTATE_HANDLE_OFFSET;
    let theta = normalize_angle(rotation).to_radians();
    // (0, -reach) turned clockwise by theta in y-down space
    Point::new(
        center.x + reach * theta.sin(),
        center.y - reach * theta.cos(),
    )
}

/// Classify `pointer` against the selection.
///
/// The rotate handle wins over everything else. For the circle, presses within
/// the annulus `radius - 20 ..= radius + 10` resize, presses strictly inside it
/// drag and anything further out is ignored. For the rectangle, presses near a
/// corner resize from that corner and presses inside drag.
pub fn hit_test(shape: CropShape, rect: &Rect, rotation: f64, pointer: Point) -> HitZone {
    if rotate_handle_position(rect, rotation).distance_to(pointer) <= HANDLE_RADIUS {
        return HitZone::RotateHandle;
    }

    match shape {
        CropShape::Circle => {
            let radius = rect.width / 2.0;
            let distance = rect.center().distance_to(pointer);
            if distance < radius - RESIZE_INNER_TOLERANCE {
                HitZone::Inside
            } else if distance <= radius + RESIZE_OUTER_TOLERANCE {
                HitZone::ResizeEdge
            } else {
                HitZone::None
            }
        }
        CropShape::Rectangle => {
            let corner = Corner::ALL
                .into_iter()
                .map(|c| (c, c.of(rect).distance_to(pointer)))
                .filter(|(_, d)| *d <= HANDLE_RADIUS)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            match corner {
                Some((c, _)) => HitZone::Corner(c),
                None if rect.contains_point(pointer) => HitZone::Inside,
                None => HitZone::None,
            }
        }
    }
}
