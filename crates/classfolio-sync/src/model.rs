//! Classroom and Drive records consumed and produced by the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The student whose submissions are being downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    /// Display name, used for the student's directory.
    pub name: String,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One student submission for a piece of course work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub course_work_id: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A submission attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Attachment {
    /// A file stored in Google Drive.
    #[serde(rename_all = "camelCase")]
    DriveFile {
        id: String,
        #[serde(default)]
        title: Option<String>,
    },
    /// An external web link.
    #[serde(rename_all = "camelCase")]
    Link {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl Attachment {
    pub fn drive_file(id: impl Into<String>) -> Self {
        Attachment::DriveFile {
            id: id.into(),
            title: None,
        }
    }

    pub fn link(url: impl Into<String>, title: Option<&str>) -> Self {
        Attachment::Link {
            url: url.into(),
            title: title.map(str::to_string),
        }
    }

    /// Identity used to detect the same attachment twice: the Drive file ID or the URL.
    pub fn key(&self) -> &str {
        match self {
            Attachment::DriveFile { id, .. } => id,
            Attachment::Link { url, .. } => url,
        }
    }
}

/// Drive metadata needed to decide how to fetch a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileMetadata {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
}

/// Record of a file written into an assignment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedFileInfo {
    /// Drive file ID, or the URL for links.
    pub source_id: String,
    pub file_name: String,
    /// Location relative to the assignment directory, `/`-separated.
    pub relative_path: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    pub downloaded_at: DateTime<Utc>,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub assignment_name: String,
    /// A shortcut written for a web link rather than a Drive file.
    #[serde(default)]
    pub is_link: bool,
}
