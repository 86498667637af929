//! Local image storage for product photos.
//!
//! Files land under `images.dir` with key `products/{unix_millis}-{name}`
//! and are served back from `/images/`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::config::ImagesConfig;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image body is empty")]
    Empty,

    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_base_url: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        ImageStore {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ImagesConfig) -> Self {
        Self::new(&config.dir, &config.public_base_url)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under a fresh key.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredImage, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let key = format!("products/{}-{}", Utc::now().timestamp_millis(), sanitize_filename(filename));
        let path = self.dir.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        info!(key = %key, bytes = bytes.len(), "Image stored");
        Ok(StoredImage {
            url: format!("{}/{}", self.public_base_url, key),
            key,
        })
    }
}

/// Reduces a client-supplied name to `[A-Za-z0-9._-]`, never a path.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
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
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("elf mint.jpg"), "elf_mint.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..hidden"), "hidden");
        assert_eq!(sanitize_filename("фото.png"), "____.png");
        assert_eq!(sanitize_filename(""), "image");
    }

    #[tokio::test]
    async fn test_save_writes_under_products() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "/images/");

        let stored = store.save("elf.jpg", b"\xff\xd8\xff").await.unwrap();

        assert!(stored.key.starts_with("products/"));
        assert!(stored.key.ends_with("-elf.jpg"));
        assert_eq!(stored.url, format!("/images/{}", stored.key));
        let written = std::fs::read(dir.path().join(&stored.key)).unwrap();
        assert_eq!(written, b"\xff\xd8\xff");
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "/images");
        assert!(matches!(store.save("a.png", &[]).await, Err(ImageError::Empty)));
    }
}
