//! Crop editor session.
//!
//! [`CropEditor`] ties the pieces together for one editor window: it loads an
//! original off the UI thread, fits it into the container, restores saved
//! geometry, feeds pointer events to the [`CropController`] and writes the final
//! crop.
//!
//! # Deferred restore
//!
//! The container usually has no size yet when an original finishes loading.
//! Saved settings found at that point are parked in `pending_restore` and
//! applied by the first [`CropEditor::container_resized`] call that reports a
//! real size. Nothing polls.

mod host;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};
use thiserror::Error;

pub use host::{Cutout, EditorEvent, EditorFrame, EditorHost};

use crate::cache::{ImageCache, LoadedImage};
use crate::config::EditorConfig;
use crate::crop::CropState;
use crate::decode::{decode_image, resize_to_fit, DecodeError};
use crate::encode::{encode_bitmap, EncodeError, OutputFormat};
use crate::geometry::{fit, DisplayMetrics, Size};
use crate::interaction::{CaptureChange, CropController, PointerEvent, PointerResponse};
use crate::render::{render_final_crop, render_preview};
use crate::settings::CropSettings;

/// Errors surfaced by editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no image loaded")]
    NoImage,

    #[error("failed to decode image: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode image: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

/// One crop editor window's state.
pub struct CropEditor<H: EditorHost> {
    config: EditorConfig,
    host: H,
    cache: ImageCache,
    image: Option<Arc<LoadedImage>>,
    original: Option<PathBuf>,
    container: Size,
    controller: CropController,
    /// Whether the controller's metrics come from a measured container.
    measured: bool,
    /// Settings waiting for the container to be measured.
    pending_restore: Option<CropSettings>,
}

impl<H: EditorHost> CropEditor<H> {
    pub fn new(config: EditorConfig, host: H) -> Self {
        let config = config.sanitized();
        let controller = CropController::new(CropState::new(
            config.shape,
            config.constraints,
            config.fallback_metrics,
        ));
        Self {
            cache: ImageCache::new(config.cache_capacity),
            config,
            host,
            image: None,
            original: None,
            container: Size::default(),
            controller,
            measured: false,
            pending_restore: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Path of the loaded original.
    pub fn original(&self) -> Option<&Path> {
        self.original.as_deref()
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_deref()
    }

    pub fn state(&self) -> &CropState {
        self.controller.state()
    }

    pub fn has_pending_restore(&self) -> bool {
        self.pending_restore.is_some()
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Current geometry in the persisted form.
    pub fn crop_settings(&self) -> CropSettings {
        self.controller.state().to_settings()
    }

    /// Originals the host has stored, for the gallery panel.
    pub fn gallery(&self) -> Vec<PathBuf> {
        self.host.available_images()
    }

    /// Load an original and restore its saved geometry.
    ///
    /// Reading and decoding run off the calling thread. On failure the editor
    /// keeps whatever it showed before.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Io` if the file cannot be read and
    /// `EditorError::Decode` if it is not a supported image.
    pub async fn load_original(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref().to_path_buf();
        let image = self.fetch(&path).await?;

        if self.controller.cancel() == CaptureChange::Release {
            debug!("new original while dragging, releasing pointer capture");
            self.host.emit(EditorEvent::PointerCaptureReleased);
        }

        let metrics = self.metrics_for(&image);
        self.controller = CropController::new(CropState::new(
            self.config.shape,
            self.config.constraints,
            metrics.unwrap_or(self.config.fallback_metrics),
        ));
        self.image = Some(image);
        self.original = Some(path.clone());
        self.measured = metrics.is_some();
        self.pending_restore = None;

        match self.host.crop_settings(&path) {
            Some(settings) if !settings.is_well_formed() => {
                warn!(
                    "ignoring malformed crop settings for {}, using defaults",
                    path.display()
                );
            }
            Some(settings) => match metrics {
                Some(metrics) => {
                    self.restore(&settings, &metrics);
                }
                None => {
                    debug!("container not measured yet, deferring crop restore");
                    self.pending_restore = Some(settings);
                }
            },
            None => {}
        }

        info!("loaded original {}", path.display());
        self.host.emit(EditorEvent::OriginalImageSelected(path));
        self.apply();
        Ok(())
    }

    /// The container was laid out with a new size.
    ///
    /// Applies a pending restore once the size is real; otherwise re-projects
    /// the current selection so it keeps its place on the image.
    pub fn container_resized(&mut self, size: Size) {
        self.container = size;
        let Some(image) = self.image.clone() else {
            return;
        };
        let Some(metrics) = self.metrics_for(&image) else {
            return;
        };

        let state = self.controller.state_mut();
        state.remap(metrics);
        if !self.measured {
            // Anything on the fallback metrics is a placeholder
            state.reset();
            self.measured = true;
            if let Some(settings) = self.pending_restore.take() {
                debug!("applying deferred crop restore");
                self.restore(&settings, &metrics);
            }
        }
        self.apply();
    }

    /// Feed a pointer event; redraws once if the geometry changed.
    pub fn pointer(&mut self, event: PointerEvent) -> PointerResponse {
        if self.image.is_none() {
            return PointerResponse::default();
        }
        let response = self.controller.handle(event);
        if response.geometry_changed {
            self.apply();
        }
        response
    }

    /// Put the selection back to its default position.
    pub fn reset(&mut self) {
        if self.controller.state_mut().reset() {
            self.apply();
        }
    }

    /// Render the final crop and write it where the host asks.
    ///
    /// Returns `Ok(None)` when the user cancels the save dialog. Failures are
    /// logged and returned; the editor stays usable either way.
    pub async fn save(&mut self) -> Result<Option<PathBuf>, EditorError> {
        let image = self.image.clone().ok_or(EditorError::NoImage)?;
        let Some(path) = self.host.request_save_path().await else {
            debug!("save cancelled");
            return Ok(None);
        };

        match self.write_crop(image, &path).await {
            Ok(()) => {
                info!("saved crop to {}", path.display());
                self.host.emit(EditorEvent::ImageSaved(path.clone()));
                Ok(Some(path))
            }
            Err(e) => {
                error!("failed to save crop to {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// The frame the host would be given for the current geometry.
    pub fn frame(&self) -> EditorFrame {
        let state = self.controller.state();
        let rect = state.rect();
        let rotation = state.rotation();
        let metrics = *state.metrics();
        let preview = self.image.as_ref().and_then(|image| {
            render_preview(&image.preview, &rect, rotation, &metrics, state.shape())
        });
        EditorFrame {
            rect,
            rotation,
            metrics,
            cutout: Cutout::new(state.shape(), rect, rotation),
            preview,
        }
    }

    fn apply(&self) {
        self.host.present(&self.frame());
    }

    fn restore(&mut self, settings: &CropSettings, metrics: &DisplayMetrics) -> bool {
        match settings.restore(metrics) {
            Some(restored) => self
                .controller
                .state_mut()
                .set_geometry(restored.rect, restored.rotation),
            None => false,
        }
    }

    fn metrics_for(&self, image: &LoadedImage) -> Option<DisplayMetrics> {
        fit(self.container, image.source.size())
    }

    async fn fetch(&mut self, path: &Path) -> Result<Arc<LoadedImage>, EditorError> {
        let modified = tokio::fs::metadata(path).await?.modified()?;
        if let Some(image) = self.cache.get(path, modified) {
            return Ok(image);
        }

        let bytes = tokio::fs::read(path).await?;
        let max_edge = self.config.preview_max_edge;
        let filter = self.config.preview_filter;
        let loaded = tokio::task::spawn_blocking(move || -> Result<LoadedImage, DecodeError> {
            let source = decode_image(&bytes)?;
            let preview = resize_to_fit(&source, max_edge, filter)?;
            Ok(LoadedImage { source, preview })
        })
        .await
        .map_err(|e| EditorError::Task(e.to_string()))??;

        debug!(
            "decoded {} ({}x{})",
            path.display(),
            loaded.source.width,
            loaded.source.height
        );
        Ok(self.cache.insert(path.to_path_buf(), modified, loaded))
    }

    async fn write_crop(&self, image: Arc<LoadedImage>, path: &Path) -> Result<(), EditorError> {
        let state = self.controller.state();
        let (rect, rotation, metrics, shape) =
            (state.rect(), state.rotation(), *state.metrics(), state.shape());
        let format = OutputFormat::for_path(path, shape, self.config.jpeg_quality);

        let bytes = tokio::task::spawn_blocking(move || {
            let cropped = render_final_crop(&image.source, &rect, rotation, &metrics, shape);
            encode_bitmap(&cropped, format)
        })
        .await
        .map_err(|e| EditorError::Task(e.to_string()))??;

        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}
