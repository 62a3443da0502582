//! File downloads.

use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::info;
use tokio::fs;

use inkframe_core::artifact::MimeType;

/// Receives exported files.
pub trait Download: Send + Sync {
    /// Saves `bytes` under `filename` and returns where they went.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be written.
    fn save(
        &self,
        filename: &str,
        bytes: &[u8],
        mime_type: MimeType,
    ) -> impl Future<Output = io::Result<PathBuf>> + Send;
}

/// Writes downloads into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FsDownloads {
    directory: PathBuf,
}

impl FsDownloads {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Download for FsDownloads {
    async fn save(&self, filename: &str, bytes: &[u8], mime_type: MimeType) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(filename);
        fs::write(&path, bytes).await?;
        info!(path:? = path, mime_type:% = mime_type, bytes = bytes.len(); "File exported");
        Ok(path)
    }
}

/// Builds `<prefix>-<unix millis>.<ext>`.
///
/// ```
/// # use chrono::{TimeZone, Utc};
/// # use inkframe::sink::export_filename;
/// # use inkframe_core::artifact::MimeType;
/// let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
/// assert_eq!(export_filename("diagram", MimeType::Png, at), "diagram-1700000000123.png");
/// ```
pub fn export_filename(prefix: &str, mime_type: MimeType, at: DateTime<Utc>) -> String {
    format!(
        "{prefix}-{}.{}",
        at.timestamp_millis(),
        mime_type.extension()
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_export_filename() {
        let at = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(
            export_filename("inkframe-diagram", MimeType::Svg, at),
            "inkframe-diagram-42.svg"
        );
    }

    #[tokio::test]
    async fn test_fs_downloads_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = FsDownloads::new(dir.path().join("nested"));
        let path = downloads
            .save("a.svg", b"<svg/>", MimeType::Svg)
            .await
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"<svg/>");
    }
}
