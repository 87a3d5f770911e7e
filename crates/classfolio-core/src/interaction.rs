//! Pointer input for the crop selection.
//!
//! [`CropController`] turns toolkit-agnostic pointer samples into
//! [`CropState`] transitions. It tracks pointer capture, chooses the cursor for
//! each position and reports whether the geometry changed, so the owner applies
//! the new geometry at most once per event.

use crate::crop::{hit_test, resize_cursor_for, CropState, CursorHint, HitZone, InteractionKind};
use crate::geometry::Point;

/// One pointer reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Position in container coordinates.
    pub position: Point,
    /// Whether the primary button is held.
    pub primary_down: bool,
}

impl PointerSample {
    pub fn new(position: Point, primary_down: bool) -> Self {
        Self {
            position,
            primary_down,
        }
    }
}

/// Pointer notifications delivered by the hosting toolkit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed(PointerSample),
    Moved(PointerSample),
    Released(PointerSample),
    /// The window lost pointer capture, e.g. on focus change.
    CaptureLost,
}

/// Pointer capture change the host should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureChange {
    #[default]
    Unchanged,
    Acquire,
    Release,
}

/// Outcome of handling one [`PointerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerResponse {
    /// The selection rectangle or rotation changed.
    pub geometry_changed: bool,
    pub cursor: CursorHint,
    pub capture: CaptureChange,
}

/// Drives a [`CropState`] from pointer events.
#[derive(Debug, Clone)]
pub struct CropController {
    state: CropState,
    captured: bool,
}

impl CropController {
    pub fn new(state: CropState) -> Self {
        Self {
            state,
            captured: false,
        }
    }

    pub fn state(&self) -> &CropState {
        &self.state
    }

    /// Mutable access for programmatic changes (restore, resize, reset).
    pub fn state_mut(&mut self) -> &mut CropState {
        &mut self.state
    }

    pub fn has_capture(&self) -> bool {
        self.captured
    }

    pub fn handle(&mut self, event: PointerEvent) -> PointerResponse {
        match event {
            PointerEvent::Pressed(sample) => self.press(sample),
            PointerEvent::Moved(sample) => self.moved(sample),
            PointerEvent::Released(sample) => {
                let capture = self.finish();
                PointerResponse {
                    geometry_changed: false,
                    cursor: self.hover_cursor(sample.position),
                    capture,
                }
            }
            PointerEvent::CaptureLost => {
                // Capture is already gone, nothing to release
                self.state.end();
                self.captured = false;
                PointerResponse::default()
            }
        }
    }

    /// Abandon any active interaction, e.g. before the image is replaced.
    ///
    /// Returns `CaptureChange::Release` if capture was held; the host must
    /// release it since no release event will follow.
    pub fn cancel(&mut self) -> CaptureChange {
        self.finish()
    }

    /// Cursor for a pointer hovering at `position` with no interaction active.
    pub fn hover_cursor(&self, position: Point) -> CursorHint {
        let rect = self.state.rect();
        hit_test(self.state.shape(), &rect, self.state.rotation(), position).cursor(&rect, position)
    }

    fn press(&mut self, sample: PointerSample) -> PointerResponse {
        let position = sample.position;
        if !sample.primary_down || !self.state.is_idle() {
            return PointerResponse {
                cursor: self.active_cursor(position),
                ..Default::default()
            };
        }

        let rect = self.state.rect();
        let zone = hit_test(self.state.shape(), &rect, self.state.rotation(), position);
        let started = match zone {
            HitZone::None => false,
            HitZone::Inside => self.state.begin_drag(position),
            HitZone::ResizeEdge => self.state.begin_uniform_resize(position),
            HitZone::Corner(corner) => self.state.begin_directional_resize(corner),
            HitZone::RotateHandle => self.state.begin_rotate(position),
        };

        let capture = if started && !self.captured {
            self.captured = true;
            CaptureChange::Acquire
        } else {
            CaptureChange::Unchanged
        };

        PointerResponse {
            geometry_changed: false,
            cursor: zone.cursor(&rect, position),
            capture,
        }
    }

    fn moved(&mut self, sample: PointerSample) -> PointerResponse {
        let position = sample.position;
        if self.state.is_idle() {
            return PointerResponse {
                cursor: self.hover_cursor(position),
                ..Default::default()
            };
        }

        // Button came up without a release event reaching us
        if !sample.primary_down {
            let capture = self.finish();
            return PointerResponse {
                geometry_changed: false,
                cursor: self.hover_cursor(position),
                capture,
            };
        }

        let geometry_changed = self.state.update(position);
        PointerResponse {
            geometry_changed,
            cursor: self.active_cursor(position),
            capture: CaptureChange::Unchanged,
        }
    }

    fn finish(&mut self) -> CaptureChange {
        self.state.end();
        if self.captured {
            self.captured = false;
            CaptureChange::Release
        } else {
            CaptureChange::Unchanged
        }
    }

    fn active_cursor(&self, position: Point) -> CursorHint {
        match self.state.mode().kind() {
            InteractionKind::Idle => self.hover_cursor(position),
            InteractionKind::Dragging => CursorHint::Move,
            InteractionKind::Resizing => resize_cursor_for(self.state.rect().center(), position),
            InteractionKind::Rotating => CursorHint::Rotate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::{CropConstraints, CropShape, ROTATE_HANDLE_OFFSET};
    use crate::geometry::{DisplayMetrics, Rect, Size};

    fn metrics() -> DisplayMetrics {
        DisplayMetrics::new(Size::new(400.0, 300.0), Point::new(0.0, 0.0))
    }

    /// Default circle on 400x300: (80, 30, 240, 240), center (200, 150).
    fn circle_controller() -> CropController {
        CropController::new(CropState::new(
            CropShape::Circle,
            CropConstraints::default(),
            metrics(),
        ))
    }

    fn down(x: f64, y: f64) -> PointerSample {
        PointerSample::new(Point::new(x, y), true)
    }

    fn up(x: f64, y: f64) -> PointerSample {
        PointerSample::new(Point::new(x, y), false)
    }

    #[test]
    fn test_default_selection() {
        let c = circle_controller();
        assert_eq!(c.state().rect(), Rect::new(80.0, 30.0, 240.0, 240.0));
    }

    #[test]
    fn test_drag_moves_selection() {
        let mut c = circle_controller();
        let r = c.handle(PointerEvent::Pressed(down(200.0, 150.0)));
        assert_eq!(r.capture, CaptureChange::Acquire);
        assert_eq!(r.cursor, CursorHint::Move);
        assert!(!r.geometry_changed);

        let r = c.handle(PointerEvent::Moved(down(210.0, 140.0)));
        assert!(r.geometry_changed);
        assert_eq!(c.state().rect(), Rect::new(90.0, 20.0, 240.0, 240.0));

        let r = c.handle(PointerEvent::Released(up(210.0, 140.0)));
        assert_eq!(r.capture, CaptureChange::Release);
        assert!(c.state().is_idle());
        assert!(!c.has_capture());
    }

    #[test]
    fn test_drag_clamped_to_display() {
        let mut c = circle_controller();
        c.handle(PointerEvent::Pressed(down(200.0, 150.0)));
        c.handle(PointerEvent::Moved(down(1000.0, -500.0)));
        assert_eq!(c.state().rect(), Rect::new(160.0, 0.0, 240.0, 240.0));
    }

    #[test]
    fn test_edge_press_resizes_from_center() {
        let mut c = circle_controller();
        let r = c.handle(PointerEvent::Pressed(down(320.0, 150.0)));
        assert_eq!(r.cursor, CursorHint::ResizeHorizontal);
        assert_eq!(c.state().mode().kind(), InteractionKind::Resizing);

        let r = c.handle(PointerEvent::Moved(down(260.0, 150.0)));
        assert!(r.geometry_changed);
        assert_eq!(c.state().rect(), Rect::new(140.0, 90.0, 120.0, 120.0));
    }

    #[test]
    fn test_press_far_outside_is_ignored() {
        let mut c = circle_controller();
        let r = c.handle(PointerEvent::Pressed(down(395.0, 295.0)));
        assert_eq!(r.capture, CaptureChange::Unchanged);
        assert_eq!(r.cursor, CursorHint::Default);
        assert!(c.state().is_idle());

        let r = c.handle(PointerEvent::Moved(down(300.0, 200.0)));
        assert!(!r.geometry_changed);
    }

    #[test]
    fn test_rotate_handle() {
        let mut c = circle_controller();
        let handle_y = 30.0 - ROTATE_HANDLE_OFFSET;
        let r = c.handle(PointerEvent::Pressed(down(200.0, handle_y)));
        assert_eq!(r.cursor, CursorHint::Rotate);
        assert_eq!(c.state().mode().kind(), InteractionKind::Rotating);

        // From straight up to straight right: a quarter turn clockwise
        let r = c.handle(PointerEvent::Moved(down(344.0, 150.0)));
        assert!(r.geometry_changed);
        assert!((c.state().rotation() - 90.0).abs() < 1e-9);
        assert_eq!(c.state().rect(), Rect::new(80.0, 30.0, 240.0, 240.0));
    }

    #[test]
    fn test_move_without_button_is_implicit_release() {
        let mut c = circle_controller();
        c.handle(PointerEvent::Pressed(down(320.0, 150.0)));

        let r = c.handle(PointerEvent::Moved(up(200.0, 150.0)));
        assert!(!r.geometry_changed);
        assert_eq!(r.capture, CaptureChange::Release);
        assert!(c.state().is_idle());
        assert_eq!(c.state().rect(), Rect::new(80.0, 30.0, 240.0, 240.0));
    }

    #[test]
    fn test_cancel_releases_held_capture() {
        let mut c = circle_controller();
        assert_eq!(c.cancel(), CaptureChange::Unchanged);

        c.handle(PointerEvent::Pressed(down(200.0, 150.0)));
        assert_eq!(c.cancel(), CaptureChange::Release);
        assert!(c.state().is_idle());
        assert!(!c.has_capture());
        assert_eq!(c.cancel(), CaptureChange::Unchanged);
    }

    #[test]
    fn test_capture_lost_returns_to_idle() {
        let mut c = circle_controller();
        c.handle(PointerEvent::Pressed(down(200.0, 150.0)));
        let r = c.handle(PointerEvent::CaptureLost);
        assert_eq!(r, PointerResponse::default());
        assert!(c.state().is_idle());
        assert!(!c.has_capture());

        // Later moves do nothing to the geometry
        let r = c.handle(PointerEvent::Moved(down(250.0, 150.0)));
        assert!(!r.geometry_changed);
    }

    #[test]
    fn test_second_press_while_active_is_ignored() {
        let mut c = circle_controller();
        c.handle(PointerEvent::Pressed(down(200.0, 150.0)));
        let r = c.handle(PointerEvent::Pressed(down(320.0, 150.0)));
        assert_eq!(r.capture, CaptureChange::Unchanged);
        assert_eq!(c.state().mode().kind(), InteractionKind::Dragging);
    }

    #[test]
    fn test_hover_cursors() {
        let c = circle_controller();
        assert_eq!(c.hover_cursor(Point::new(200.0, 150.0)), CursorHint::Move);
        assert_eq!(
            c.hover_cursor(Point::new(200.0, 270.0)),
            CursorHint::ResizeVertical
        );
        assert_eq!(c.hover_cursor(Point::new(5.0, 5.0)), CursorHint::Default);
    }

    #[test]
    fn test_rectangle_corner_resize() {
        let mut c = CropController::new(CropState::new(
            CropShape::Rectangle,
            CropConstraints::default(),
            metrics(),
        ));
        // Default rectangle: (40, 30, 320, 240)
        assert_eq!(c.state().rect(), Rect::new(40.0, 30.0, 320.0, 240.0));

        let r = c.handle(PointerEvent::Pressed(down(360.0, 270.0)));
        assert_eq!(r.capture, CaptureChange::Acquire);
        assert_eq!(r.cursor, CursorHint::ResizeDiagonalDown);

        let r = c.handle(PointerEvent::Moved(down(300.0, 200.0)));
        assert!(r.geometry_changed);
        assert_eq!(c.state().rect(), Rect::new(40.0, 30.0, 260.0, 170.0));
    }
}
