//! Repository for the `visual_styles` table (one row per series).

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::visual_style::{UpsertVisualStyle, VisualStyle};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, series_id, style_name, color_palette, lighting, camera_style, \
                       aspect_ratio, film_stock, reference_notes, created_at, updated_at";

pub struct VisualStyleRepo;

impl VisualStyleRepo {
    /// Fetch the style of a series, if one has been set.
    pub async fn find_by_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Option<VisualStyle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM visual_styles WHERE series_id = $1");
        sqlx::query_as::<_, VisualStyle>(&query)
            .bind(series_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or fully replace the style of a series.
    pub async fn upsert(
        pool: &PgPool,
        series_id: DbId,
        input: &UpsertVisualStyle,
    ) -> Result<VisualStyle, sqlx::Error> {
        let palette = serde_json::to_value(input.color_palette.as_deref().unwrap_or_default())
            .unwrap_or_else(|_| serde_json::Value::Array(Vec::new()));
        let query = format!(
            "INSERT INTO visual_styles
                (series_id, style_name, color_palette, lighting, camera_style,
                 aspect_ratio, film_stock, reference_notes)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, '16:9'), $7, $8)
             ON CONFLICT ON CONSTRAINT uq_visual_styles_series DO UPDATE SET
                style_name = EXCLUDED.style_name,
                color_palette = EXCLUDED.color_palette,
                lighting = EXCLUDED.lighting,
                camera_style = EXCLUDED.camera_style,
                aspect_ratio = EXCLUDED.aspect_ratio,
                film_stock = EXCLUDED.film_stock,
                reference_notes = EXCLUDED.reference_notes
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VisualStyle>(&query)
            .bind(series_id)
            .bind(&input.style_name)
            .bind(palette)
            .bind(&input.lighting)
            .bind(&input.camera_style)
            .bind(&input.aspect_ratio)
            .bind(&input.film_stock)
            .bind(&input.reference_notes)
            .fetch_one(pool)
            .await
    }

    /// Remove the style of a series. Returns `true` if a row was removed.
    pub async fn delete_by_series(pool: &PgPool, series_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM visual_styles WHERE series_id = $1")
            .bind(series_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
