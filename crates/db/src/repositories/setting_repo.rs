//! Repository for the `settings` table.

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::setting::{CreateSetting, Setting, UpdateSetting};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, series_id, name, setting_type, time_of_day, description, atmosphere, \
                       created_at, updated_at";

/// Provides CRUD operations for settings (locations).
pub struct SettingRepo;

impl SettingRepo {
    /// Insert a new setting. Enum fields default to `interior` / `unspecified`.
    pub async fn create(
        pool: &PgPool,
        series_id: DbId,
        input: &CreateSetting,
    ) -> Result<Setting, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings (series_id, name, setting_type, time_of_day, description, atmosphere)
             VALUES ($1, $2, COALESCE($3, 'interior'), COALESCE($4, 'unspecified'), $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(series_id)
            .bind(&input.name)
            .bind(&input.setting_type)
            .bind(&input.time_of_day)
            .bind(&input.description)
            .bind(&input.atmosphere)
            .fetch_one(pool)
            .await
    }

    /// Find a setting only if it belongs to `series_id`.
    pub async fn find_in_series(
        pool: &PgPool,
        series_id: DbId,
        id: DbId,
    ) -> Result<Option<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE id = $1 AND series_id = $2");
        sqlx::query_as::<_, Setting>(&query)
            .bind(id)
            .bind(series_id)
            .fetch_optional(pool)
            .await
    }

    /// List all settings of a series, ordered by name ascending.
    pub async fn list_by_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<Setting>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM settings
             WHERE series_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(series_id)
            .fetch_all(pool)
            .await
    }

    /// Update a setting. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSetting,
    ) -> Result<Option<Setting>, sqlx::Error> {
        let query = format!(
            "UPDATE settings SET
                name = COALESCE($2, name),
                setting_type = COALESCE($3, setting_type),
                time_of_day = COALESCE($4, time_of_day),
                description = COALESCE($5, description),
                atmosphere = COALESCE($6, atmosphere)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.setting_type)
            .bind(&input.time_of_day)
            .bind(&input.description)
            .bind(&input.atmosphere)
            .fetch_optional(pool)
            .await
    }

    /// Delete a setting. Segments referencing it have `setting_id` cleared.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
