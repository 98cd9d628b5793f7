//! Character entity model and DTOs.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A character row from the `characters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub series_id: DbId,
    pub name: String,
    /// One of `protagonist`, `antagonist`, `supporting`, `minor`.
    pub role: String,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub appearance: Option<String>,
    /// Structured appearance produced by vision analysis. `None` until the
    /// character has been analyzed.
    pub visual_fingerprint: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a character.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacter {
    pub name: String,
    /// Defaults to `supporting`.
    pub role: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub appearance: Option<String>,
}

/// DTO for updating a character. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCharacter {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub appearance: Option<String>,
}
