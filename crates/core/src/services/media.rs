//! Photo upload service.

use std::sync::Arc;

use image::ImageFormat;
use tracing::{debug, info, warn};
use tweeter_common::{AppError, AppResult, StorageBackend, UploadedFile, generate_storage_key};

/// Shared storage handle.
pub type StorageService = Arc<dyn StorageBackend>;

/// Accepts image uploads and writes them to the media store.
#[derive(Clone)]
pub struct MediaService {
    storage: StorageService,
    max_upload_bytes: usize,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(storage: StorageService, max_upload_bytes: usize) -> Self {
        Self {
            storage,
            max_upload_bytes,
        }
    }

    /// Store a photo uploaded by `user_id` and return its metadata.
    ///
    /// The format is sniffed from the bytes; the client-supplied content type
    /// is ignored.
    pub async fn store_photo(&self, user_id: &str, data: &[u8]) -> AppResult<UploadedFile> {
        if data.is_empty() {
            return Err(AppError::field("photo", "The submitted file is empty."));
        }
        if data.len() > self.max_upload_bytes {
            return Err(AppError::field(
                "photo",
                format!(
                    "File too large. Maximum size is {} bytes.",
                    self.max_upload_bytes
                ),
            ));
        }

        let (content_type, extension) = sniff_image(data).ok_or_else(|| {
            AppError::field(
                "photo",
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
            )
        })?;

        let key = generate_storage_key(user_id, extension);
        let uploaded = self.storage.upload(&key, data, content_type).await?;
        info!(key = %uploaded.key, size = uploaded.size, "Stored photo");
        Ok(uploaded)
    }

    /// Remove a stored photo that ended up unused.
    ///
    /// Failures are logged, not returned.
    pub async fn discard(&self, key: &str) {
        match self.storage.delete(key).await {
            Ok(()) => debug!(key, "Discarded photo"),
            Err(e) => warn!(key, error = %e, "Failed to discard photo"),
        }
    }
}

/// Detect a supported image format, returning its MIME type and extension.
fn sniff_image(data: &[u8]) -> Option<(&'static str, &'static str)> {
    match image::guess_format(data).ok()? {
        ImageFormat::Jpeg => Some(("image/jpeg", "jpg")),
        ImageFormat::Png => Some(("image/png", "png")),
        ImageFormat::Gif => Some(("image/gif", "gif")),
        ImageFormat::WebP => Some(("image/webp", "webp")),
        _ => None,
    }
}
