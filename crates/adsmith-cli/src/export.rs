//! Artifact export: writes inline payloads or downloaded URLs to a file.

use std::path::{Path, PathBuf};

use adsmith_core::domain::ContentRef;
use adsmith_core::ports::{ArtifactExport, ExportError};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// `ArtifactExport` over reqwest and the local filesystem.
pub struct HttpArtifactExport {
    client: reqwest::Client,
}

impl HttpArtifactExport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExportError::Download(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Download(format!("{url} answered {status}")));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExportError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ArtifactExport for HttpArtifactExport {
    async fn export(&self, content: &ContentRef, target: &Path) -> Result<PathBuf, ExportError> {
        let bytes = match content {
            ContentRef::Inline(payload) => STANDARD
                .decode(payload.data.as_bytes())
                .map_err(|e| ExportError::Decode(e.to_string()))?,
            ContentRef::Url(url) => self.fetch(url).await?,
        };

        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, &bytes).await?;
        tracing::info!(path = %target.display(), bytes = bytes.len(), "artifact exported");
        Ok(target.to_path_buf())
    }
}
