//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;

/// Google Drive REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Name of the per-assignment download manifest.
pub const DEFAULT_MANIFEST_FILE_NAME: &str = ".classfolio-downloads.json";

/// Settings for [`crate::SubmissionProcessor`] and [`crate::HttpDriveClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on downloads in flight. `None` means no bound.
    pub max_concurrency: Option<usize>,
    /// Base URL of the Drive API.
    pub api_base: String,
    pub user_agent: String,
    /// File kept in each assignment directory to remember what was downloaded.
    pub manifest_file_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: concat!("Classfolio/", env!("CARGO_PKG_VERSION")).to_string(),
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Config with a global cap on concurrent downloads.
    pub fn bounded(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: Some(max_concurrency),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> SyncResult<Self> {
        let mut config: PipelineConfig = toml::from_str(s)?;
        // A zero bound would never admit a download
        if config.max_concurrency == Some(0) {
            config.max_concurrency = Some(1);
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}
