//! Local object storage for character reference images and segment videos.
//!
//! Objects are addressed by slash-separated keys relative to a root
//! directory, e.g. `characters/42/0190c3f2-....png`. Keys are generated by
//! [`object_key`] and validated on every access so a key can never escape
//! the storage root.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum size of a character reference image (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum size of an uploaded segment video (500 MiB).
pub const MAX_VIDEO_BYTES: usize = 500 * 1024 * 1024;

/// Accepted image content types and the extension stored for each.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
];

/// Accepted video extensions and their content types.
const VIDEO_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
];

/// Object key prefix for character reference images.
pub const KIND_CHARACTER_IMAGE: &str = "characters";

/// Object key prefix for segment videos.
pub const KIND_SEGMENT_VIDEO: &str = "videos";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the object store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    #[error("Object '{0}' not found")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Build a fresh object key: `{kind}/{owner_id}/{uuid}.{ext}`.
pub fn object_key(kind: &str, owner_id: DbId, ext: &str) -> String {
    format!("{kind}/{owner_id}/{}.{ext}", uuid::Uuid::now_v7())
}

/// Reject empty keys, absolute keys and keys with `..` or other
/// non-normal path components.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    let all_normal = Path::new(key)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !all_normal {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Upload validation
// ---------------------------------------------------------------------------

/// Validate an uploaded image. Returns the file extension to store it under.
pub fn validate_image_upload(content_type: &str, len: usize) -> Result<&'static str, CoreError> {
    let ext = IMAGE_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unsupported image type '{content_type}'. Supported: png, jpeg, webp"
            ))
        })?;
    if len == 0 {
        return Err(CoreError::Validation("Image file is empty".into()));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "Image exceeds the {} MiB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(ext)
}

/// Validate an uploaded video by file extension. Returns `(ext, content_type)`.
pub fn validate_video_upload(
    filename: &str,
    len: usize,
) -> Result<(&'static str, &'static str), CoreError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    let (ext, content_type) = VIDEO_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .copied()
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unsupported video format '.{ext}'. Supported: .mp4, .webm, .mov"
            ))
        })?;
    if len == 0 {
        return Err(CoreError::Validation("Video file is empty".into()));
    }
    if len > MAX_VIDEO_BYTES {
        return Err(CoreError::Validation(format!(
            "Video exceeds the {} MiB limit",
            MAX_VIDEO_BYTES / (1024 * 1024)
        )));
    }
    Ok((ext, content_type))
}

/// Read `(width, height)` from an image header without decoding pixels.
///
/// Returns `None` when the format cannot be recognised.
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

// ---------------------------------------------------------------------------
// LocalStorage
// ---------------------------------------------------------------------------

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its on-disk path.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Write an object, creating parent directories as needed.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key, bytes = bytes.len(), "Stored object");
        Ok(())
    }

    /// Read an entire object into memory.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open an object for streaming. Returns the file and its length.
    pub async fn open(&self, key: &str) -> Result<(tokio::fs::File, u64), StorageError> {
        let path = self.path_for(key)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    /// Delete an object. Deleting a missing object is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
