//! Setting (location) entity model and DTOs.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A setting row from the `settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Setting {
    pub id: DbId,
    pub series_id: DbId,
    pub name: String,
    pub setting_type: String,
    pub time_of_day: String,
    pub description: Option<String>,
    pub atmosphere: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a setting.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSetting {
    pub name: String,
    /// Defaults to `interior`.
    pub setting_type: Option<String>,
    /// Defaults to `unspecified`.
    pub time_of_day: Option<String>,
    pub description: Option<String>,
    pub atmosphere: Option<String>,
}

/// DTO for updating a setting. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSetting {
    pub name: Option<String>,
    pub setting_type: Option<String>,
    pub time_of_day: Option<String>,
    pub description: Option<String>,
    pub atmosphere: Option<String>,
}
