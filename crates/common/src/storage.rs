//! Media storage for uploaded post images.

use std::path::PathBuf;

use crate::config::MediaConfig;
use crate::{AppError, AppResult};

/// Stored file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path relative to the media root).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `key`.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Create a local storage backend from the media configuration.
    #[must_use]
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.path.clone(), config.url.clone())
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        tracing::debug!(key = %key, size = data.len(), "Stored media file");

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Generate a unique storage key for an uploaded file.
///
/// Keys look like `{prefix}/{yyyy}/{mm}/{dd}/{uuid}.{ext}`; the extension is
/// taken from the original file name and falls back to `bin`.
#[must_use]
pub fn generate_storage_key(prefix: &str, original_name: &str) -> String {
    use chrono::Utc;

    let date_path = Utc::now().format("%Y/%m/%d").to_string();

    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    format!(
        "{}/{}/{}.{}",
        prefix.trim_matches('/'),
        date_path,
        uuid::Uuid::new_v4().simple(),
        extension
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key("posts", "photo.JPG");
        assert!(key.starts_with("posts/"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_generate_storage_key_no_extension() {
        let key = generate_storage_key("posts", "file");
        assert!(key.ends_with(".bin"));

        let key = generate_storage_key("posts", ".hidden");
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_public_url_joins_prefix() {
        let storage = LocalStorage::new(PathBuf::from("/tmp"), "/media/".to_string());
        assert_eq!(storage.public_url("posts/a.png"), "/media/posts/a.png");
    }

    #[tokio::test]
    async fn test_local_upload_and_delete() {
        let dir = std::env::temp_dir().join(format!("yatube-storage-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(dir.clone(), "/media".to_string());

        let uploaded = storage
            .upload("posts/test.gif", b"GIF89a", "image/gif")
            .await
            .unwrap();
        assert_eq!(uploaded.size, 6);
        assert_eq!(uploaded.url, "/media/posts/test.gif");
        assert!(dir.join("posts/test.gif").exists());

        storage.delete("posts/test.gif").await.unwrap();
        assert!(!dir.join("posts/test.gif").exists());

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
