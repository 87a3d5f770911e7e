//! Collaborators supplied by the window hosting the editor.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::crop::{rotate_handle_position, CropShape};
use crate::decode::Bitmap;
use crate::geometry::{DisplayMetrics, Point, Rect};
use crate::settings::CropSettings;

/// Notifications for the hosting window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A final crop was written to this path.
    ImageSaved(PathBuf),
    /// An original was loaded into the editor.
    OriginalImageSelected(PathBuf),
    /// An interaction was abandoned while the pointer was captured; release it.
    PointerCaptureReleased,
}

/// Hole punched into the dimming overlay above the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutout {
    pub shape: CropShape,
    /// Selection in container coordinates.
    pub rect: Rect,
    /// Center of the rotate handle drawn with the cutout.
    pub rotate_handle: Point,
}

impl Cutout {
    pub fn new(shape: CropShape, rect: Rect, rotation: f64) -> Self {
        Self {
            shape,
            rect,
            rotate_handle: rotate_handle_position(&rect, rotation),
        }
    }
}

/// Everything the window redraws after a geometry change.
///
/// Selection transform, overlay cutout and preview always travel together so the
/// window never shows one of them out of step with the others.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorFrame {
    pub rect: Rect,
    /// Rotation of the image content in degrees, clockwise.
    pub rotation: f64,
    pub metrics: DisplayMetrics,
    pub cutout: Cutout,
    /// `None` when the selection is degenerate.
    pub preview: Option<Bitmap>,
}

/// Window-side services the editor depends on.
pub trait EditorHost: Send + Sync {
    /// Ask the user where to save the final crop. `None` means cancelled.
    fn request_save_path(&self) -> BoxFuture<'_, Option<PathBuf>>;

    /// Previously stored originals for the gallery panel.
    fn available_images(&self) -> Vec<PathBuf>;

    /// Saved geometry for an original, if any.
    fn crop_settings(&self, original: &Path) -> Option<CropSettings>;

    /// Redraw with new geometry.
    fn present(&self, frame: &EditorFrame);

    fn emit(&self, event: EditorEvent);
}
