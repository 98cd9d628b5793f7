//! Per-series visual style model.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single visual style row of a series.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VisualStyle {
    pub id: DbId,
    pub series_id: DbId,
    pub style_name: Option<String>,
    /// JSON array of colour strings.
    pub color_palette: serde_json::Value,
    pub lighting: Option<String>,
    pub camera_style: Option<String>,
    pub aspect_ratio: String,
    pub film_stock: Option<String>,
    pub reference_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `PUT` (create or replace).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertVisualStyle {
    pub style_name: Option<String>,
    pub color_palette: Option<Vec<String>>,
    pub lighting: Option<String>,
    pub camera_style: Option<String>,
    /// Defaults to `16:9`.
    pub aspect_ratio: Option<String>,
    pub film_stock: Option<String>,
    pub reference_notes: Option<String>,
}
