//! Uploaded post images, stored under `<media_dir>/posts/`.
//!
//! Stored names are generated; the client's file name is only logged. The
//! content must be a GIF, PNG, JPEG or WebP image, recognised by its magic
//! bytes.

use std::path::{Path, PathBuf};

use models::post;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Directory of post images relative to the media root.
pub const POSTS_DIR: &str = "posts";

/// An image file as received from a form.
#[derive(Clone, Default)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// File extension for a recognised image format.
fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an uploaded image and return its path relative to the media root.
    pub async fn save_post_image(&self, upload: &ImageUpload) -> Result<String, ServiceError> {
        if upload.bytes.is_empty() {
            return Err(ServiceError::Validation("The submitted file is empty.".into()));
        }
        let ext = sniff_image(&upload.bytes).ok_or_else(|| {
            ServiceError::Validation("Upload a valid image. The file you uploaded was either not an image or a corrupted image.".into())
        })?;
        let relative = format!("{POSTS_DIR}/{}.{ext}", Uuid::new_v4().simple());
        post::validate_image(&relative)?;

        let dir = self.root.join(POSTS_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Db(format!("cannot create {}: {e}", dir.display())))?;
        let target = self.root.join(&relative);
        tokio::fs::write(&target, &upload.bytes)
            .await
            .map_err(|e| ServiceError::Db(format!("cannot write {}: {e}", target.display())))?;
        info!(original = %upload.file_name, stored = %relative, size = upload.bytes.len(), "image_stored");
        Ok(relative)
    }

    /// Best-effort removal of a stored image.
    pub async fn remove(&self, relative: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            warn!(%relative, error = %e, "cannot remove stored image");
        }
    }
}
