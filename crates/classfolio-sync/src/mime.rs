//! How each Drive MIME type is fetched.

use crate::sanitize::{sanitize_segment, with_extension};

/// Archives are linked rather than downloaded; unpacking them is left to the reader.
const ARCHIVE_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/x-7z-compressed",
    "application/x-tar",
    "application/gzip",
    "application/x-gzip",
];

const GOOGLE_APPS_PREFIX: &str = "application/vnd.google-apps.";

/// Fetch strategy for one Drive file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPlan {
    /// Write an internet shortcut to the Drive view page.
    Shortcut,
    /// Export a Google editor document to an Office format.
    Export {
        mime_type: &'static str,
        extension: &'static str,
    },
    /// Download the stored bytes.
    Direct,
}

impl DownloadPlan {
    /// Pick the plan for a Drive MIME type.
    pub fn for_mime(mime_type: &str) -> Self {
        let mime_type = mime_type.trim();
        if ARCHIVE_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
        {
            return DownloadPlan::Shortcut;
        }

        let Some(kind) = mime_type.strip_prefix(GOOGLE_APPS_PREFIX) else {
            return DownloadPlan::Direct;
        };
        match kind {
            "document" => DownloadPlan::Export {
                mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                extension: "docx",
            },
            "spreadsheet" => DownloadPlan::Export {
                mime_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                extension: "xlsx",
            },
            "presentation" => DownloadPlan::Export {
                mime_type: "application/vnd.openxmlformats-officedocument.presentationml.presentation",
                extension: "pptx",
            },
            "drawing" => DownloadPlan::Export {
                mime_type: "image/png",
                extension: "png",
            },
            // Forms, sites, folders and the like have no file form
            _ => DownloadPlan::Shortcut,
        }
    }

    /// Local file name for a Drive file called `drive_name`.
    pub fn file_name(&self, drive_name: &str) -> String {
        match self {
            DownloadPlan::Shortcut => shortcut_name(drive_name),
            DownloadPlan::Export { extension, .. } => {
                with_extension(&sanitize_segment(drive_name), extension)
            }
            DownloadPlan::Direct => sanitize_segment(drive_name),
        }
    }
}

/// `name.url`, sanitized.
pub fn shortcut_name(name: &str) -> String {
    let base = sanitize_segment(name);
    sanitize_segment(&format!("{base}.url"))
}
