//! Processing of a single attachment.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use log::debug;

use crate::drive::DriveSource;
use crate::error::SyncResult;
use crate::mime::{shortcut_name, DownloadPlan};
use crate::model::{Attachment, DownloadedFileInfo};
use crate::naming::{DirectoryLedger, Reservation};
use crate::shortcut::{drive_view_url, internet_shortcut};

/// Where an attachment goes and whose it is.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentTarget<'a> {
    /// Assignment directory.
    pub dir: &'a Path,
    pub student: &'a str,
    pub assignment: &'a str,
}

/// Content and metadata of a fetched attachment, ready to write.
struct Fetched {
    bytes: Vec<u8>,
    mime_type: Option<String>,
    modified_time: Option<DateTime<Utc>>,
    is_link: bool,
}

/// Fetches one attachment into an assignment directory.
#[derive(Clone)]
pub struct AttachmentProcessor {
    source: Arc<dyn DriveSource>,
}

impl AttachmentProcessor {
    pub fn new(source: Arc<dyn DriveSource>) -> Self {
        Self { source }
    }

    /// Write `attachment` into the target directory, placing it through `ledger`.
    ///
    /// The ledger is locked only around reservation and recording, never across
    /// a download. A failed write gives its reservation back.
    pub async fn process(
        &self,
        attachment: &Attachment,
        target: &AttachmentTarget<'_>,
        ledger: &Mutex<DirectoryLedger>,
    ) -> SyncResult<DownloadedFileInfo> {
        match attachment {
            Attachment::DriveFile { id, .. } => self.process_drive_file(id, target, ledger).await,
            Attachment::Link { url, title } => {
                let name = shortcut_name(title.as_deref().unwrap_or_else(|| link_label(url)));
                let reservation = lock(ledger).reserve(url, &name);
                let fetched = Fetched {
                    bytes: internet_shortcut(url).into_bytes(),
                    mime_type: None,
                    modified_time: None,
                    is_link: true,
                };
                finish(target, ledger, reservation, fetched).await
            }
        }
    }

    async fn process_drive_file(
        &self,
        file_id: &str,
        target: &AttachmentTarget<'_>,
        ledger: &Mutex<DirectoryLedger>,
    ) -> SyncResult<DownloadedFileInfo> {
        let meta = self.source.metadata(file_id).await?;
        let plan = DownloadPlan::for_mime(&meta.mime_type);
        let file_name = plan.file_name(&meta.name);
        debug!("{} ({}) -> {} via {:?}", meta.name, meta.mime_type, file_name, plan);

        let reservation = lock(ledger).reserve(file_id, &file_name);

        let content = match plan {
            DownloadPlan::Shortcut => Ok(internet_shortcut(&drive_view_url(file_id)).into_bytes()),
            DownloadPlan::Export { mime_type, .. } => self.source.export(file_id, mime_type).await,
            DownloadPlan::Direct => self.source.download(file_id).await,
        };
        let bytes = match content {
            Ok(bytes) => bytes,
            Err(e) => {
                lock(ledger).release(&reservation);
                return Err(e);
            }
        };

        let fetched = Fetched {
            bytes,
            mime_type: Some(meta.mime_type),
            modified_time: meta.modified_time,
            is_link: false,
        };
        finish(target, ledger, reservation, fetched).await
    }
}

async fn finish(
    target: &AttachmentTarget<'_>,
    ledger: &Mutex<DirectoryLedger>,
    reservation: Reservation,
    fetched: Fetched,
) -> SyncResult<DownloadedFileInfo> {
    let path = reservation.path_in(target.dir);
    if let Err(e) = write_file(&path, &fetched.bytes).await {
        lock(ledger).release(&reservation);
        return Err(e);
    }

    let info = DownloadedFileInfo {
        source_id: reservation.source_id,
        file_name: reservation.file_name,
        relative_path: reservation.relative_path,
        mime_type: fetched.mime_type,
        modified_time: fetched.modified_time,
        downloaded_at: Utc::now(),
        student_name: target.student.to_string(),
        assignment_name: target.assignment.to_string(),
        is_link: fetched.is_link,
    };
    lock(ledger).record(info.clone());
    Ok(info)
}

async fn write_file(path: &Path, bytes: &[u8]) -> SyncResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Shortcut label for a link without a title: host and path of the URL.
fn link_label(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.trim_end_matches('/')
}

pub(crate) fn lock(ledger: &Mutex<DirectoryLedger>) -> std::sync::MutexGuard<'_, DirectoryLedger> {
    // Poisoning leaves the ledger intact
    ledger.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_label() {
        assert_eq!(link_label("https://example.com/a/b/"), "example.com/a/b");
        assert_eq!(link_label("example.com"), "example.com");
    }

    #[test]
    fn test_link_shortcut_name() {
        assert_eq!(
            shortcut_name(link_label("https://example.com/a/b")),
            "example.comab.url"
        );
    }
}
