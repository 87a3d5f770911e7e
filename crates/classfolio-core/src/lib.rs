//! Classfolio Core - profile photo crop editor
//!
//! This crate provides the crop editor behind student profile photos: display
//! fitting, the selection state machine and its pointer handling, persisted crop
//! geometry, rendering of the circular or rectangular crop, and the editor session
//! that loads originals and saves results.

pub mod cache;
pub mod config;
pub mod crop;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod geometry;
pub mod interaction;
pub mod render;
pub mod settings;

pub use config::EditorConfig;
pub use crop::{CropConstraints, CropShape, CropState};
pub use editor::{CropEditor, EditorError, EditorEvent, EditorFrame, EditorHost};
pub use geometry::{fit, DisplayMetrics, ImagePixelSize, Point, Rect, Size};
pub use interaction::{CropController, PointerEvent, PointerSample};
pub use render::{render_final_crop, render_preview};
pub use settings::CropSettings;
