//! Repository for the `series` table.

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::series::{CreateSeries, Series, UpdateSeries};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, owner_id, title, logline, description, genre, created_at, updated_at";

/// Provides CRUD operations for series.
pub struct SeriesRepo;

impl SeriesRepo {
    /// Insert a new series owned by `owner_id`.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateSeries,
    ) -> Result<Series, sqlx::Error> {
        let query = format!(
            "INSERT INTO series (owner_id, title, logline, description, genre)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.logline)
            .bind(&input.description)
            .bind(&input.genre)
            .fetch_one(pool)
            .await
    }

    /// Find a series by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Series>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM series WHERE id = $1");
        sqlx::query_as::<_, Series>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's series, most recently updated first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Series>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM series
             WHERE owner_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Return the owner of a series, or `None` if it does not exist.
    pub async fn owner_of(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT owner_id FROM series WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a series. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSeries,
    ) -> Result<Option<Series>, sqlx::Error> {
        let query = format!(
            "UPDATE series SET
                title = COALESCE($2, title),
                logline = COALESCE($3, logline),
                description = COALESCE($4, description),
                genre = COALESCE($5, genre)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.logline)
            .bind(&input.description)
            .bind(&input.genre)
            .fetch_optional(pool)
            .await
    }

    /// Delete a series and, by cascade, everything beneath it.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM series WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
