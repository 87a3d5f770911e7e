//! Classfolio Sync - submission attachment downloader
//!
//! This crate downloads the attachments of a student's classroom submissions into
//! a local folder tree. Drive files are fetched directly or exported from Google
//! editor formats, archives and other non-exportable files become internet
//! shortcuts, and links are saved as `.url` files. File placement is stable across
//! runs and name collisions are resolved with numbered subfolders.

pub mod attachment;
pub mod config;
pub mod drive;
pub mod error;
pub mod mime;
pub mod model;
pub mod naming;
pub mod sanitize;
pub mod shortcut;
pub mod submission;

pub use config::PipelineConfig;
pub use drive::{DriveSource, HttpDriveClient};
pub use error::{SyncError, SyncResult};
pub use model::{Attachment, DownloadedFileInfo, DriveFileMetadata, Student, Submission};
pub use submission::{AttachmentOutcome, AttachmentReport, SubmissionProcessor, SyncReport};
