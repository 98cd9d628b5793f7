//! Episode entity model and DTOs.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An episode row from the `episodes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Episode {
    pub id: DbId,
    pub series_id: DbId,
    pub episode_number: i32,
    pub title: String,
    pub synopsis: Option<String>,
    pub screenplay: Option<String>,
    /// One of `draft`, `in_progress`, `complete`.
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an episode.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEpisode {
    /// Defaults to one past the highest number in the series.
    pub episode_number: Option<i32>,
    pub title: String,
    pub synopsis: Option<String>,
    pub screenplay: Option<String>,
    /// Defaults to `draft`.
    pub status: Option<String>,
}

/// DTO for updating an episode. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEpisode {
    pub episode_number: Option<i32>,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub screenplay: Option<String>,
    pub status: Option<String>,
}
