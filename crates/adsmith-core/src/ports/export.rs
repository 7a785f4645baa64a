//! ArtifactExport port - saving an artifact's content to disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{ContentRef, MediaClass};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("download failed: {0}")]
    Download(String),

    #[error("inline payload is not valid base64: {0}")]
    Decode(String),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes artifact content to a file and returns its path.
#[async_trait]
pub trait ArtifactExport: Send + Sync {
    async fn export(&self, content: &ContentRef, target: &Path) -> Result<PathBuf, ExportError>;
}

/// Filename used when the caller does not pick one.
pub fn default_filename(media: MediaClass) -> &'static str {
    match media {
        MediaClass::Image => "generated-ad.png",
        MediaClass::Video => "generated-video.mp4",
    }
}
