//! Segment entity model and DTOs.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A segment row: one shot-sized slice of an episode.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Segment {
    pub id: DbId,
    pub episode_id: DbId,
    pub segment_index: i32,
    pub title: String,
    pub description: Option<String>,
    pub dialogue: Option<String>,
    pub duration_secs: f64,
    pub setting_id: Option<DbId>,
    pub character_ids: Vec<DbId>,
    pub status: String,
    pub generated_prompt: Option<String>,
    pub shot_list: Option<String>,
    /// Parsed shots from the last roundtable run.
    pub shots: Option<serde_json::Value>,
    pub roundtable_transcript: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSegment {
    /// Defaults to one past the highest index in the episode.
    pub segment_index: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub dialogue: Option<String>,
    /// Defaults to 5 seconds.
    pub duration_secs: Option<f64>,
    pub setting_id: Option<DbId>,
    pub character_ids: Option<Vec<DbId>>,
    pub status: Option<String>,
}

/// DTO for updating a segment. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSegment {
    pub segment_index: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub dialogue: Option<String>,
    pub duration_secs: Option<f64>,
    pub setting_id: Option<DbId>,
    pub character_ids: Option<Vec<DbId>>,
    pub status: Option<String>,
    pub generated_prompt: Option<String>,
}

/// Output of a finished roundtable run.
#[derive(Debug, Clone)]
pub struct RoundtableResult {
    pub generated_prompt: String,
    pub shot_list: String,
    pub shots: serde_json::Value,
    pub transcript: serde_json::Value,
}
