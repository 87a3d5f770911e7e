//! Internet shortcut (`.url`) files.

use std::path::Path;

use crate::error::SyncResult;

/// Page showing a Drive file in the browser.
pub fn drive_view_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{file_id}/view")
}

/// Contents of a Windows internet shortcut pointing at `url`.
pub fn internet_shortcut(url: &str) -> String {
    format!("[InternetShortcut]\r\nURL={url}\r\n")
}

/// Write a shortcut file, creating parent directories as needed.
pub async fn write_shortcut(path: &Path, url: &str) -> SyncResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, internet_shortcut(url)).await?;
    Ok(())
}
