//! Uploaded file storage
//!
//! Files land under the media root in a per-kind subdirectory with a random
//! prefix, and are served back under `/media/`.

use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` and return the path relative to the media root
    pub async fn save(&self, kind: &str, file_name: &str, bytes: &[u8]) -> std::io::Result<String> {
        let dir = self.root.join(kind);
        tokio::fs::create_dir_all(&dir).await?;

        let relative = format!("{}/{}_{}", kind, Uuid::new_v4().simple(), sanitize(file_name));
        tokio::fs::write(self.root.join(&relative), bytes).await?;
        tracing::debug!(path = %relative, size = bytes.len(), "Stored upload");
        Ok(relative)
    }
}

/// Whether the file name looks like an image
pub fn is_image(file_name: &str) -> bool {
    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}

/// Absolute download URL for a stored path
pub fn media_url(base: &str, relative: &str) -> String {
    format!("{}/media/{}", base.trim_end_matches('/'), relative)
}

/// Keep the last path component, replacing anything outside [A-Za-z0-9._-]
fn sanitize(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("report.pdf"), "report.pdf");
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize(".."), "upload");
    }

    #[test]
    fn test_is_image() {
        assert!(is_image("avatar.PNG"));
        assert!(is_image("photo.jpeg"));
        assert!(!is_image("notes.txt"));
        assert!(!is_image("no_extension"));
    }

    #[test]
    fn test_media_url() {
        assert_eq!(
            media_url("http://localhost:8000/", "attachments/a.pdf"),
            "http://localhost:8000/media/attachments/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_save_writes_under_kind() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::open(dir.path()).unwrap();

        let relative = store.save("attachments", "notes.txt", b"hello").await.unwrap();
        assert!(relative.starts_with("attachments/"));
        assert!(relative.ends_with("_notes.txt"));
        assert_eq!(std::fs::read(dir.path().join(&relative)).unwrap(), b"hello");
    }
}
