//! Series entity model and DTOs.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A series row. Root of the ownership hierarchy.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Series {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a series. The owner comes from the session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSeries {
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
}

/// DTO for updating a series. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSeries {
    pub title: Option<String>,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
}
