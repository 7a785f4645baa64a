//! FileHistoryStorage - one JSON file per namespace.
//!
//! 書き込みは同じディレクトリの一時ファイル → rename。
//! ファイルは常に「前の版」か「新しい版」のどちらか。

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::domain::HistoryError;
use crate::ports::HistoryStorage;

/// Stores `<dir>/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    dir: PathBuf,
}

impl FileHistoryStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.json"))
    }
}

fn write_atomic(dir: &Path, path: &Path, payload: &[u8]) -> Result<(), HistoryError> {
    std::fs::create_dir_all(dir)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(payload)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| HistoryError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl HistoryStorage for FileHistoryStorage {
    async fn read(&self, namespace: &str) -> Result<Option<String>, HistoryError> {
        match tokio::fs::read_to_string(self.path_for(namespace)).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, namespace: &str, payload: String) -> Result<(), HistoryError> {
        let dir = self.dir.clone();
        let path = self.path_for(namespace);

        // tempfile is synchronous; keep it off the async workers.
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, payload.as_bytes()))
            .await
            .map_err(|e| HistoryError::Task(e.to_string()))?
    }

    async fn remove(&self, namespace: &str) -> Result<(), HistoryError> {
        match tokio::fs::remove_file(self.path_for(namespace)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileHistoryStorage::new(dir.path());

        assert!(storage.read("generated_images").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileHistoryStorage::new(dir.path().join("nested"));

        storage
            .write("generated_videos", "[1,2,3]".to_string())
            .await
            .unwrap();
        assert!(dir.path().join("nested/generated_videos.json").exists());
        assert_eq!(
            storage.read("generated_videos").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );

        storage.write("generated_videos", "[]".to_string()).await.unwrap();
        assert_eq!(
            storage.read("generated_videos").await.unwrap().as_deref(),
            Some("[]")
        );

        storage.remove("generated_videos").await.unwrap();
        assert!(storage.read("generated_videos").await.unwrap().is_none());
        // Removing twice is fine.
        storage.remove("generated_videos").await.unwrap();
    }

    #[tokio::test]
    async fn namespaces_are_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileHistoryStorage::new(dir.path());

        storage.write("generated_images", "\"i\"".into()).await.unwrap();
        storage.write("generated_videos", "\"v\"".into()).await.unwrap();

        assert_eq!(
            storage.read("generated_images").await.unwrap().as_deref(),
            Some("\"i\"")
        );
        assert_eq!(
            storage.read("generated_videos").await.unwrap().as_deref(),
            Some("\"v\"")
        );
    }
}
