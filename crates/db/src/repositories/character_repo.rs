//! Repository for the `characters` table.

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::{Character, CreateCharacter, UpdateCharacter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, series_id, name, role, description, personality, appearance, \
                       visual_fingerprint, created_at, updated_at";

/// Provides CRUD operations for characters plus fingerprint storage.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character. If `role` is `None`, defaults to `supporting`.
    pub async fn create(
        pool: &PgPool,
        series_id: DbId,
        input: &CreateCharacter,
    ) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (series_id, name, role, description, personality, appearance)
             VALUES ($1, $2, COALESCE($3, 'supporting'), $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(series_id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.description)
            .bind(&input.personality)
            .bind(&input.appearance)
            .fetch_one(pool)
            .await
    }

    /// Find a character only if it belongs to `series_id`.
    pub async fn find_in_series(
        pool: &PgPool,
        series_id: DbId,
        id: DbId,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1 AND series_id = $2");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(series_id)
            .fetch_optional(pool)
            .await
    }

    /// List all characters of a series, ordered by name ascending.
    pub async fn list_by_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE series_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(series_id)
            .fetch_all(pool)
            .await
    }

    /// Fetch the given characters of a series, ordered by name.
    /// IDs that are not in the series are silently absent from the result.
    pub async fn list_by_ids(
        pool: &PgPool,
        series_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE series_id = $1 AND id = ANY($2)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(series_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Count how many distinct IDs in `ids` are characters of `series_id`.
    pub async fn count_in_series(
        pool: &PgPool,
        series_id: DbId,
        ids: &[DbId],
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM characters WHERE series_id = $1 AND id = ANY($2)",
        )
        .bind(series_id)
        .bind(ids)
        .fetch_one(pool)
        .await
    }

    /// Update a character. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                description = COALESCE($4, description),
                personality = COALESCE($5, personality),
                appearance = COALESCE($6, appearance)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.description)
            .bind(&input.personality)
            .bind(&input.appearance)
            .fetch_optional(pool)
            .await
    }

    /// Store the result of vision analysis.
    pub async fn set_visual_fingerprint(
        pool: &PgPool,
        id: DbId,
        fingerprint: &serde_json::Value,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET visual_fingerprint = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(fingerprint)
            .fetch_optional(pool)
            .await
    }

    /// Delete a character. Relationships and images cascade; segments keep
    /// a dangling id in `character_ids` which readers ignore.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
