//! Crop rectangle and rotation state machine.

use serde::{Deserialize, Serialize};

use super::{clamp_within, Corner, CropShape};
use crate::geometry::{normalize_angle, DisplayMetrics, Point, Rect, Size};
use crate::settings::CropSettings;

/// Distances below this are treated as a press exactly on the center.
const MIN_GRAB_DISTANCE: f64 = 1e-6;

/// Size limits for the selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConstraints {
    /// Smallest selection side in display pixels.
    pub min_size: f64,
    /// Largest selection side as a fraction of the displayed image (0, 1].
    pub max_ratio: f64,
    /// Optional cap from the space available in the hosting window.
    pub max_extent: Option<f64>,
    /// Size of a fresh selection as a fraction of the displayed image.
    pub default_ratio: f64,
}

impl Default for CropConstraints {
    fn default() -> Self {
        Self {
            min_size: 50.0,
            max_ratio: 1.0,
            max_extent: None,
            default_ratio: 0.8,
        }
    }
}

impl CropConstraints {
    /// Largest selection allowed on `metrics`.
    ///
    /// The circular editor derives one side from the shorter display edge; the
    /// rectangular editor limits each axis by its own display edge.
    pub fn max_size(&self, shape: CropShape, metrics: &DisplayMetrics) -> Size {
        let ratio = self.max_ratio.clamp(f64::EPSILON, 1.0);
        let cap = |v: f64| match self.max_extent {
            Some(extent) if extent > 0.0 => v.min(extent),
            _ => v,
        };
        match shape {
            CropShape::Circle => {
                let side = cap(metrics.size.min_side() * ratio);
                Size::new(side, side)
            }
            CropShape::Rectangle => Size::new(
                cap(metrics.size.width * ratio),
                cap(metrics.size.height * ratio),
            ),
        }
    }

    /// Smallest selection allowed on `metrics`, never above [`Self::max_size`].
    pub fn min_size(&self, shape: CropShape, metrics: &DisplayMetrics) -> Size {
        let max = self.max_size(shape, metrics);
        let min = self.min_size.max(1.0);
        Size::new(min.min(max.width), min.min(max.height))
    }

    /// A centered selection sized by `default_ratio`.
    pub fn default_rect(&self, shape: CropShape, metrics: &DisplayMetrics) -> Rect {
        let ratio = self.default_ratio.clamp(f64::EPSILON, 1.0);
        let (w, h) = match shape {
            CropShape::Circle => {
                let side = metrics.size.min_side() * ratio;
                (side, side)
            }
            CropShape::Rectangle => (metrics.size.width * ratio, metrics.size.height * ratio),
        };
        let center = metrics.bounds().center();
        self.clamp_rect(
            shape,
            metrics,
            Rect::new(center.x - w / 2.0, center.y - h / 2.0, w, h),
        )
    }

    /// Bring `rect` inside the size limits and the display bounds.
    ///
    /// Size is clamped around the rectangle's center first, then the position is
    /// moved so the rectangle lies inside the displayed image. The circular
    /// editor collapses the rectangle to a square on its shorter side.
    pub fn clamp_rect(&self, shape: CropShape, metrics: &DisplayMetrics, rect: Rect) -> Rect {
        let min = self.min_size(shape, metrics);
        let max = self.max_size(shape, metrics);
        let center = rect.center();

        let (w, h) = match shape {
            CropShape::Circle => {
                let side = clamp_within(rect.width.min(rect.height), min.width, max.width);
                (side, side)
            }
            CropShape::Rectangle => (
                clamp_within(rect.width, min.width, max.width),
                clamp_within(rect.height, min.height, max.height),
            ),
        };

        let b = metrics.bounds();
        let x = clamp_within(center.x - w / 2.0, b.x, b.right() - w);
        let y = clamp_within(center.y - h / 2.0, b.y, b.bottom() - h);
        Rect::new(x, y, w, h)
    }
}

/// Active pointer interaction and the values captured when it started.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging {
        grab: Point,
        start: Rect,
    },
    /// Scale from the fixed center by pointer distance (circular editor).
    ResizingUniform {
        center: Point,
        start_distance: f64,
        start_half: Size,
    },
    /// Drag one corner while the opposite corner stays anchored (rectangular editor).
    ResizingDirectional {
        corner: Corner,
        anchor: Point,
    },
    Rotating {
        center: Point,
        start_pointer_angle: f64,
        initial_angle: f64,
    },
}

/// Coarse classification of [`InteractionMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Idle,
    Dragging,
    Resizing,
    Rotating,
}

impl InteractionMode {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionMode::Idle => InteractionKind::Idle,
            InteractionMode::Dragging { .. } => InteractionKind::Dragging,
            InteractionMode::ResizingUniform { .. } | InteractionMode::ResizingDirectional { .. } => {
                InteractionKind::Resizing
            }
            InteractionMode::Rotating { .. } => InteractionKind::Rotating,
        }
    }
}

/// The selection on a displayed image and the interaction driving it.
///
/// Every mutating method returns `true` only when the rectangle or rotation
/// actually changed, which is the signal for the owner to re-apply geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CropState {
    shape: CropShape,
    constraints: CropConstraints,
    metrics: DisplayMetrics,
    rect: Rect,
    rotation: f64,
    mode: InteractionMode,
}

impl CropState {
    /// A fresh, centered selection on `metrics`.
    pub fn new(shape: CropShape, constraints: CropConstraints, metrics: DisplayMetrics) -> Self {
        Self {
            shape,
            constraints,
            metrics,
            rect: constraints.default_rect(shape, &metrics),
            rotation: 0.0,
            mode: InteractionMode::Idle,
        }
    }

    pub fn shape(&self) -> CropShape {
        self.shape
    }

    pub fn constraints(&self) -> &CropConstraints {
        &self.constraints
    }

    pub fn metrics(&self) -> &DisplayMetrics {
        &self.metrics
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn is_idle(&self) -> bool {
        self.mode == InteractionMode::Idle
    }

    /// Snapshot of the current geometry for persistence.
    pub fn to_settings(&self) -> CropSettings {
        CropSettings::capture(&self.rect, self.rotation, &self.metrics)
    }

    /// Replace geometry, clamping the rectangle and normalizing the angle.
    pub fn set_geometry(&mut self, rect: Rect, rotation: f64) -> bool {
        let rect = self.constraints.clamp_rect(self.shape, &self.metrics, rect);
        self.commit(rect, normalize_angle(rotation))
    }

    /// Drop back to the default centered selection with no rotation.
    pub fn reset(&mut self) -> bool {
        self.mode = InteractionMode::Idle;
        let rect = self.constraints.default_rect(self.shape, &self.metrics);
        self.commit(rect, 0.0)
    }

    /// Move onto new display metrics, re-projecting the selection.
    ///
    /// The rectangle keeps its placement relative to the displayed image. Any
    /// interaction in progress is abandoned since its captured values refer to
    /// the old metrics.
    pub fn remap(&mut self, metrics: DisplayMetrics) -> bool {
        let restored = self.to_settings().restore(&metrics);
        self.metrics = metrics;
        self.mode = InteractionMode::Idle;
        let rect = match restored {
            Some(restored) => self.constraints.clamp_rect(self.shape, &metrics, restored.rect),
            None => self.constraints.default_rect(self.shape, &metrics),
        };
        let rotation = self.rotation;
        self.commit(rect, rotation)
    }

    /// Start moving the whole selection.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.mode = InteractionMode::Dragging {
            grab: pointer,
            start: self.rect,
        };
        true
    }

    /// Start a center-anchored resize.
    pub fn begin_uniform_resize(&mut self, pointer: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        let center = self.rect.center();
        self.mode = InteractionMode::ResizingUniform {
            center,
            start_distance: center.distance_to(pointer),
            start_half: Size::new(self.rect.width / 2.0, self.rect.height / 2.0),
        };
        true
    }

    /// Start a resize from `corner`, anchored at the opposite corner.
    pub fn begin_directional_resize(&mut self, corner: Corner) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.mode = InteractionMode::ResizingDirectional {
            corner,
            anchor: corner.opposite().of(&self.rect),
        };
        true
    }

    /// Start rotating the content around the selection's center.
    pub fn begin_rotate(&mut self, pointer: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        let center = self.rect.center();
        self.mode = InteractionMode::Rotating {
            center,
            start_pointer_angle: center.angle_to(pointer),
            initial_angle: self.rotation,
        };
        true
    }

    /// Feed a pointer position to the active interaction.
    pub fn update(&mut self, pointer: Point) -> bool {
        match self.mode {
            InteractionMode::Idle => false,
            InteractionMode::Dragging { grab, start } => {
                let rect = self.dragged(start, pointer.x - grab.x, pointer.y - grab.y);
                let rotation = self.rotation;
                self.commit(rect, rotation)
            }
            InteractionMode::ResizingUniform {
                center,
                start_distance,
                start_half,
            } => {
                if start_distance <= MIN_GRAB_DISTANCE {
                    return false;
                }
                let scale = center.distance_to(pointer) / start_distance;
                let rect = self.scaled_about(center, start_half, scale);
                let rotation = self.rotation;
                self.commit(rect, rotation)
            }
            InteractionMode::ResizingDirectional { corner, anchor } => {
                let rect = self.stretched(corner, anchor, pointer);
                let rotation = self.rotation;
                self.commit(rect, rotation)
            }
            InteractionMode::Rotating {
                center,
                start_pointer_angle,
                initial_angle,
            } => {
                let delta = center.angle_to(pointer) - start_pointer_angle;
                let rect = self.rect;
                self.commit(rect, normalize_angle(initial_angle + delta))
            }
        }
    }

    /// Leave the active interaction. Used for release and for lost pointer capture.
    pub fn end(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    fn dragged(&self, start: Rect, dx: f64, dy: f64) -> Rect {
        let b = self.metrics.bounds();
        Rect::new(
            clamp_within(start.x + dx, b.x, b.right() - start.width),
            clamp_within(start.y + dy, b.y, b.bottom() - start.height),
            start.width,
            start.height,
        )
    }

    fn scaled_about(&self, center: Point, start_half: Size, scale: f64) -> Rect {
        let min = self.constraints.min_size(self.shape, &self.metrics);
        let max = self.constraints.max_size(self.shape, &self.metrics);
        let b = self.metrics.bounds();

        // Room between the fixed center and each display edge
        let room_x = (center.x - b.x).min(b.right() - center.x).max(0.0);
        let room_y = (center.y - b.y).min(b.bottom() - center.y).max(0.0);

        let mut half_w =
            clamp_within(start_half.width * scale, min.width / 2.0, max.width / 2.0).min(room_x);
        let mut half_h =
            clamp_within(start_half.height * scale, min.height / 2.0, max.height / 2.0).min(room_y);

        if self.shape == CropShape::Circle {
            let half = half_w.min(half_h);
            half_w = half;
            half_h = half;
        }

        Rect::new(
            center.x - half_w,
            center.y - half_h,
            half_w * 2.0,
            half_h * 2.0,
        )
    }

    fn stretched(&self, corner: Corner, anchor: Point, pointer: Point) -> Rect {
        let min = self.constraints.min_size(self.shape, &self.metrics);
        let max = self.constraints.max_size(self.shape, &self.metrics);
        let b = self.metrics.bounds();
        let (sx, sy) = corner.signs();

        let room_x = if sx > 0.0 { b.right() - anchor.x } else { anchor.x - b.x };
        let room_y = if sy > 0.0 { b.bottom() - anchor.y } else { anchor.y - b.y };

        let mut w = clamp_within((pointer.x - anchor.x) * sx, min.width, max.width).min(room_x);
        let mut h = clamp_within((pointer.y - anchor.y) * sy, min.height, max.height).min(room_y);

        if self.shape == CropShape::Circle {
            let side = w.max(h).min(room_x).min(room_y).min(max.width);
            w = side;
            h = side;
        }

        let x = if sx > 0.0 { anchor.x } else { anchor.x - w };
        let y = if sy > 0.0 { anchor.y } else { anchor.y - h };
        Rect::new(x, y, w, h)
    }

    fn commit(&mut self, rect: Rect, rotation: f64) -> bool {
        if rect == self.rect && rotation == self.rotation {
            return false;
        }
        self.rect = rect;
        self.rotation = rotation;
        true
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
