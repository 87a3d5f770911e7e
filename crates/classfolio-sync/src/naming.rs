//! File placement inside one assignment directory.
//!
//! A [`DirectoryLedger`] decides where each attachment is written:
//!
//! 1. An attachment already written here (same Drive file ID or link URL) goes
//!    back to the same path and overwrites it.
//! 2. A different attachment whose file name is already taken by a file or a
//!    collision folder, compared case-sensitively, goes into a subfolder named after the file's stem with a
//!    numeric suffix: `Name_2/`, `Name_3/`, ...
//! 3. Anything else is written straight into the directory.
//!
//! The ledger persists as a JSON manifest inside the directory, so rule 1 also
//! holds across sync runs.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::SyncResult;
use crate::model::DownloadedFileInfo;
use crate::sanitize::{split_extension, MAX_SEGMENT_LEN};

/// Where one attachment will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub source_id: String,
    pub file_name: String,
    /// Path relative to the assignment directory, `/`-separated.
    pub relative_path: String,
    /// The path belonged to this source before.
    pub reused: bool,
    claimed_name: Option<String>,
    claimed_subfolder: Option<String>,
}

impl Reservation {
    /// Absolute path under `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        self.relative_path
            .split('/')
            .fold(dir.to_path_buf(), |path, part| path.join(part))
    }
}

/// Names and sources used in one assignment directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLedger {
    by_source: HashMap<String, DownloadedFileInfo>,
    /// Reserved but not yet recorded, keyed by source.
    pending: HashMap<String, String>,
    names: HashSet<String>,
    subfolders: HashSet<String>,
}

impl DirectoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger rebuilt from earlier downloads.
    pub fn from_records(records: impl IntoIterator<Item = DownloadedFileInfo>) -> Self {
        let mut ledger = Self::new();
        for info in records {
            ledger.claim_path(&info.relative_path);
            ledger.by_source.insert(info.source_id.clone(), info);
        }
        ledger
    }

    /// Read the manifest in `dir`. A missing manifest is an empty ledger; an
    /// unreadable one is logged and ignored.
    pub async fn load(dir: &Path, manifest_name: &str) -> Self {
        let path = dir.join(manifest_name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                warn!("cannot read manifest {}: {}", path.display(), e);
                return Self::new();
            }
        };
        match serde_json::from_slice::<Vec<DownloadedFileInfo>>(&bytes) {
            Ok(records) => {
                debug!("loaded {} manifest records from {}", records.len(), path.display());
                Self::from_records(records)
            }
            Err(e) => {
                warn!("ignoring corrupt manifest {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Write the manifest into `dir`, creating it if needed.
    pub async fn save(&self, dir: &Path, manifest_name: &str) -> SyncResult<()> {
        tokio::fs::create_dir_all(dir).await?;
        let json = serde_json::to_vec_pretty(&self.records())?;
        tokio::fs::write(dir.join(manifest_name), json).await?;
        Ok(())
    }

    /// Recorded downloads, sorted by path.
    pub fn records(&self) -> Vec<DownloadedFileInfo> {
        let mut records: Vec<_> = self.by_source.values().cloned().collect();
        records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        records
    }

    pub fn get(&self, source_id: &str) -> Option<&DownloadedFileInfo> {
        self.by_source.get(source_id)
    }

    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Choose and claim the path for `source_id` saved as `file_name`.
    pub fn reserve(&mut self, source_id: &str, file_name: &str) -> Reservation {
        let known = self
            .by_source
            .get(source_id)
            .map(|info| info.relative_path.clone())
            .or_else(|| self.pending.get(source_id).cloned());
        if let Some(relative_path) = known {
            return Reservation {
                source_id: source_id.to_string(),
                file_name: file_name.to_string(),
                relative_path,
                reused: true,
                claimed_name: None,
                claimed_subfolder: None,
            };
        }

        // A collision folder of the same name blocks the root path too
        let free = !self.subfolders.contains(file_name) && self.names.insert(file_name.to_string());
        let reservation = if free {
            Reservation {
                source_id: source_id.to_string(),
                file_name: file_name.to_string(),
                relative_path: file_name.to_string(),
                reused: false,
                claimed_name: Some(file_name.to_string()),
                claimed_subfolder: None,
            }
        } else {
            let folder = self.next_subfolder(file_name);
            self.subfolders.insert(folder.clone());
            debug!("{} already taken, using {}/", file_name, folder);
            Reservation {
                source_id: source_id.to_string(),
                file_name: file_name.to_string(),
                relative_path: format!("{folder}/{file_name}"),
                reused: false,
                claimed_name: None,
                claimed_subfolder: Some(folder),
            }
        };
        self.pending
            .insert(source_id.to_string(), reservation.relative_path.clone());
        reservation
    }

    /// Give back a reservation whose download failed.
    pub fn release(&mut self, reservation: &Reservation) {
        if reservation.reused {
            return;
        }
        self.pending.remove(&reservation.source_id);
        if let Some(name) = &reservation.claimed_name {
            self.names.remove(name);
        }
        if let Some(folder) = &reservation.claimed_subfolder {
            self.subfolders.remove(folder);
        }
    }

    /// Remember a finished download.
    pub fn record(&mut self, info: DownloadedFileInfo) {
        self.pending.remove(&info.source_id);
        self.claim_path(&info.relative_path);
        self.by_source.insert(info.source_id.clone(), info);
    }

    fn claim_path(&mut self, relative_path: &str) {
        match relative_path.split_once('/') {
            Some((folder, _)) => self.subfolders.insert(folder.to_string()),
            None => self.names.insert(relative_path.to_string()),
        };
    }

    fn next_subfolder(&self, file_name: &str) -> String {
        let stem = match split_extension(file_name) {
            Some((stem, _)) => stem,
            None => file_name,
        };
        (2..)
            .map(|n| numbered_folder(stem, n))
            .find(|candidate| !self.subfolders.contains(candidate) && !self.names.contains(candidate))
            .unwrap_or_else(|| stem.to_string())
    }
}

/// `{stem}_{n}`, with the stem shortened so the whole name fits in one segment.
fn numbered_folder(stem: &str, n: u32) -> String {
    let suffix = format!("_{n}");
    let budget = MAX_SEGMENT_LEN - suffix.len();
    let head: String = stem.chars().take(budget).collect();
    format!("{}{suffix}", head.trim_end_matches([' ', '.']))
}
