//! Media storage abstraction for uploaded tweet photos.

use std::path::{Component, Path, PathBuf};

use crate::{AppError, AppResult};

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (relative path).
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
    /// Upload a file.
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

    /// Base directory files are written to.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
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
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Generate a unique storage key for a file owned by `user_id`.
#[must_use]
pub fn generate_storage_key(user_id: &str, extension: &str) -> String {
    use chrono::Utc;

    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();

    let extension = Some(extension.trim_start_matches('.'))
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(char::is_alphanumeric))
        .unwrap_or("bin");

    format!(
        "{}/{}/{}.{}",
        date_path,
        user_id,
        uuid::Uuid::new_v4().simple(),
        extension
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_storage() -> LocalStorage {
        let dir = std::env::temp_dir().join(format!("tweeter-storage-{}", uuid::Uuid::new_v4()));
        LocalStorage::new(dir, "/media/".to_string())
    }

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key("user123", "jpg");
        assert!(key.contains("/user123/"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_generate_storage_key_bad_extension() {
        assert!(generate_storage_key("user123", "").ends_with(".bin"));
        assert!(generate_storage_key("user123", "../x").ends_with(".bin"));
    }

    #[test]
    fn test_public_url_trims_slash() {
        let storage = temp_storage();
        assert_eq!(storage.public_url("a/b.png"), "/media/a/b.png");
    }

    #[tokio::test]
    async fn test_upload_and_delete() {
        let storage = temp_storage();
        let data = b"\x89PNG\r\n\x1a\nrest";

        let uploaded = storage.upload("u1/p.png", data, "image/png").await.unwrap();
        assert_eq!(uploaded.size, data.len() as u64);
        assert_eq!(uploaded.url, "/media/u1/p.png");
        assert_eq!(uploaded.md5.len(), 32);
        let path = storage.base_path().join("u1/p.png");
        assert!(path.exists());

        storage.delete("u1/p.png").await.unwrap();
        assert!(!path.exists());
        // Deleting a missing key is not an error
        storage.delete("u1/p.png").await.unwrap();

        let _ = tokio::fs::remove_dir_all(storage.base_path()).await;
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let storage = temp_storage();
        let result = storage.upload("../escape.png", b"x", "image/png").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
