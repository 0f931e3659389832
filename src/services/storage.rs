//! Blob storage for featured images
//!
//! Stores uploaded image bytes under the configured upload directory and
//! hands back an opaque reference. Discarding a reference that no longer
//! exists is not an error; deletion is idempotent.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::utils::errors::{EventlyError, Result, ValidationErrors};
use crate::utils::helpers::sanitize_filename;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// File storage service for event images
#[derive(Clone)]
pub struct StorageService {
    upload_dir: PathBuf,
}

impl StorageService {
    /// Create a new StorageService instance
    pub fn new(settings: &Settings) -> Self {
        Self {
            upload_dir: PathBuf::from(&settings.storage.upload_dir),
        }
    }

    /// Store image bytes and return the reference to persist.
    ///
    /// The stored name combines a random UUID prefix with the sanitized
    /// original name, so concurrent uploads of the same file never collide.
    pub async fn store_image(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let mut errors = ValidationErrors::new();

        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension {
            Some(ref ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => {
                errors.add("image", "Image must be a jpg, jpeg, png, gif, or webp file");
            }
        }

        if bytes.is_empty() {
            errors.add("image", "Image file is empty");
        } else if bytes.len() > MAX_IMAGE_BYTES {
            errors.add("image", "Image must be 2MB or smaller");
        }

        errors.finish()?;

        fs::create_dir_all(&self.upload_dir).await?;

        let reference = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize_filename(original_name)
        );
        fs::write(self.upload_dir.join(&reference), bytes).await?;

        info!(reference = %reference, size = bytes.len(), "Image stored");

        Ok(reference)
    }

    /// Discard a stored image; missing files are ignored
    pub async fn discard_image(&self, reference: &str) -> Result<()> {
        // Stored references are sanitized at write time; reject anything
        // that could escape the upload directory.
        if reference.contains('/') || reference.contains("..") {
            warn!(reference = %reference, "Refusing to discard suspicious reference");
            return Ok(());
        }

        match fs::remove_file(self.upload_dir.join(reference)).await {
            Ok(()) => {
                debug!(reference = %reference, "Image discarded");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EventlyError::Io(e)),
        }
    }

    /// Absolute path for serving a stored image
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.upload_dir.join(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> StorageService {
        let mut settings = Settings::default();
        settings.storage.upload_dir = dir.path().to_string_lossy().to_string();
        StorageService::new(&settings)
    }

    #[tokio::test]
    async fn test_store_and_discard_image() {
        let dir = TempDir::new().unwrap();
        let storage = service(&dir);

        let reference = storage.store_image("poster.png", b"fake image bytes").await.unwrap();
        assert!(storage.resolve(&reference).exists());

        storage.discard_image(&reference).await.unwrap();
        assert!(!storage.resolve(&reference).exists());
    }

    #[tokio::test]
    async fn test_discard_missing_image_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = service(&dir);

        assert!(storage.discard_image("never-stored.png").await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_disallowed_extension() {
        let dir = TempDir::new().unwrap();
        let storage = service(&dir);

        let result = storage.store_image("payload.exe", b"bytes").await;
        assert!(matches!(result, Err(EventlyError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let dir = TempDir::new().unwrap();
        let storage = service(&dir);

        let result = storage.store_image("poster.png", b"").await;
        assert!(matches!(result, Err(EventlyError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stored_names_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let storage = service(&dir);

        let first = storage.store_image("poster.png", b"one").await.unwrap();
        let second = storage.store_image("poster.png", b"two").await.unwrap();
        assert_ne!(first, second);
    }
}
