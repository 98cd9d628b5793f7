//! Generated or uploaded video model and DTOs.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A video row attached to a segment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub segment_id: DbId,
    /// One of `queued`, `processing`, `complete`, `failed`.
    pub status: String,
    pub provider: Option<String>,
    pub external_job_id: Option<String>,
    #[serde(skip_serializing)]
    pub storage_key: Option<String>,
    pub content_type: Option<String>,
    pub byte_size: Option<i64>,
    pub duration_secs: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Video {
    /// Whether a file is stored for this video.
    pub fn has_file(&self) -> bool {
        self.storage_key.is_some()
    }
}

/// DTO for creating a video record. `storage_key` is set only by uploads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVideo {
    /// Defaults to `queued`.
    pub status: Option<String>,
    pub provider: Option<String>,
    pub external_job_id: Option<String>,
    #[serde(skip)]
    pub storage_key: Option<String>,
    #[serde(skip)]
    pub content_type: Option<String>,
    #[serde(skip)]
    pub byte_size: Option<i64>,
    pub duration_secs: Option<f64>,
}

/// DTO for updating a video. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVideo {
    pub status: Option<String>,
    pub provider: Option<String>,
    pub external_job_id: Option<String>,
    pub duration_secs: Option<f64>,
    pub error_message: Option<String>,
}
