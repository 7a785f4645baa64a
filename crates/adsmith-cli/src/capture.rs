//! Asset capture: loads a reference image from disk.

use std::path::Path;

use adsmith_core::domain::ReferenceAsset;
use anyhow::{Context, Result, bail};

/// Upper bound on reference image size.
pub const MAX_REFERENCE_BYTES: u64 = 10 * 1024 * 1024;

/// Image MIME type inferred from the file extension.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime)
}

/// Reads `path` as a reference image for `context`.
///
/// The file must be at most 10MB and have an `image/*` type.
pub async fn capture(path: &Path, context: &str) -> Result<ReferenceAsset> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot read reference image {}", path.display()))?;
    if metadata.len() > MAX_REFERENCE_BYTES {
        bail!("Image file must be less than 10MB ({} bytes)", metadata.len());
    }

    let Some(mime) = mime_for(path) else {
        bail!("Please upload a valid image file: {}", path.display());
    };

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read reference image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reference".to_string());

    tracing::debug!(file = %file_name, mime, bytes = bytes.len(), "captured reference image");
    Ok(ReferenceAsset::new(bytes, mime, file_name, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a/shoe.PNG")), Some("image/png"));
        assert_eq!(mime_for(Path::new("shoe.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("clip.mp4")), None);
        assert_eq!(mime_for(Path::new("notes.txt")), None);
        assert_eq!(mime_for(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn captures_small_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shoe.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"png-bytes")
            .unwrap();

        let asset = capture(&path, "Place it on a beach").await.unwrap();

        assert_eq!(asset.bytes, b"png-bytes");
        assert_eq!(asset.mime, "image/png");
        assert_eq!(asset.file_name, "shoe.png");
        assert_eq!(asset.context, "Place it on a beach");
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = capture(&path, "ctx").await.unwrap_err();
        assert!(err.to_string().contains("valid image"));
    }

    #[tokio::test]
    async fn rejects_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_REFERENCE_BYTES + 1).unwrap();

        let err = capture(&path, "ctx").await.unwrap_err();
        assert!(err.to_string().contains("10MB"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(capture(&dir.path().join("gone.png"), "ctx").await.is_err());
    }
}
