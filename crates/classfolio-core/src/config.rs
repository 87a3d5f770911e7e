//! Editor configuration.
//!
//! All fields have defaults, so a host can start from `EditorConfig::default()`
//! or load a partial TOML document that overrides only what it needs:
//!
//! ```toml
//! shape = "rectangle"
//! jpeg_quality = 85
//!
//! [constraints]
//! min_size = 64.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crop::{CropConstraints, CropShape};
use crate::decode::PreviewFilter;
use crate::geometry::DisplayMetrics;

/// Default longest edge of the preview source in pixels.
pub const DEFAULT_PREVIEW_MAX_EDGE: u32 = 512;
/// Default JPEG quality for rectangular crops saved as JPEG.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;
/// Default number of decoded originals kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for a crop editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor variant.
    pub shape: CropShape,
    /// Selection size limits.
    pub constraints: CropConstraints,
    /// Longest edge of the downscaled copy used for previews.
    pub preview_max_edge: u32,
    /// Filter used to build the preview source.
    pub preview_filter: PreviewFilter,
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// Decoded originals kept in the image cache.
    pub cache_capacity: usize,
    /// Metrics used until the container reports a real size.
    pub fallback_metrics: DisplayMetrics,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            shape: CropShape::default(),
            constraints: CropConstraints::default(),
            preview_max_edge: DEFAULT_PREVIEW_MAX_EDGE,
            preview_filter: PreviewFilter::Triangle,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            fallback_metrics: DisplayMetrics::FALLBACK,
        }
    }
}

impl EditorConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(s)?;
        Ok(config.sanitized())
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Pull out-of-range values back to something usable.
    pub fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.cache_capacity = self.cache_capacity.max(1);
        self.preview_max_edge = self.preview_max_edge.max(1);
        if !self.fallback_metrics.is_measured() {
            self.fallback_metrics = DisplayMetrics::FALLBACK;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.shape, CropShape::Circle);
        assert_eq!(config.constraints.min_size, 50.0);
        assert_eq!(config.fallback_metrics.size, Size::new(400.0, 300.0));
        assert_eq!(config.fallback_metrics.offset, Point::new(100.0, 50.0));
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(EditorConfig::from_toml_str("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_toml_str(
            r#"
            shape = "rectangle"
            jpeg_quality = 75

            [constraints]
            min_size = 64.0
            max_extent = 500.0
            "#,
        )
        .unwrap();
        assert_eq!(config.shape, CropShape::Rectangle);
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.constraints.min_size, 64.0);
        assert_eq!(config.constraints.max_extent, Some(500.0));
        assert_eq!(config.constraints.default_ratio, 0.8);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_sanitizes_out_of_range() {
        let config = EditorConfig::from_toml_str(
            r#"
            jpeg_quality = 0
            cache_capacity = 0

            [fallback_metrics]
            size = { width = 0.0, height = 0.0 }
            offset = { x = 0.0, y = 0.0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.jpeg_quality, 1);
        assert_eq!(config.cache_capacity, 1);
        assert_eq!(config.fallback_metrics, DisplayMetrics::FALLBACK);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EditorConfig::from_toml_str("shape = \"hexagon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        std::fs::write(&path, "preview_max_edge = 256\n").unwrap();
        assert_eq!(EditorConfig::from_file(&path).unwrap().preview_max_edge, 256);

        let missing = EditorConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
