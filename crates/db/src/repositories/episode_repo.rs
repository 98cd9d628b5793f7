//! Repository for the `episodes` table.

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::episode::{CreateEpisode, Episode, UpdateEpisode};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, series_id, episode_number, title, synopsis, screenplay, status, \
                       created_at, updated_at";

/// Provides CRUD operations for episodes.
pub struct EpisodeRepo;

impl EpisodeRepo {
    /// Insert a new episode.
    ///
    /// If `episode_number` is `None`, the next free number in the series is
    /// used. If `status` is `None`, defaults to `draft`.
    pub async fn create(
        pool: &PgPool,
        series_id: DbId,
        input: &CreateEpisode,
    ) -> Result<Episode, sqlx::Error> {
        let query = format!(
            "INSERT INTO episodes (series_id, episode_number, title, synopsis, screenplay, status)
             VALUES (
                $1,
                COALESCE($2, (SELECT COALESCE(MAX(episode_number), 0) + 1
                              FROM episodes WHERE series_id = $1)),
                $3, $4, $5, COALESCE($6, 'draft')
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(series_id)
            .bind(input.episode_number)
            .bind(&input.title)
            .bind(&input.synopsis)
            .bind(&input.screenplay)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Find an episode by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM episodes WHERE id = $1");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an episode only if it belongs to `series_id`.
    pub async fn find_in_series(
        pool: &PgPool,
        series_id: DbId,
        id: DbId,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM episodes WHERE id = $1 AND series_id = $2");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .bind(series_id)
            .fetch_optional(pool)
            .await
    }

    /// List all episodes of a series ordered by episode number.
    pub async fn list_by_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<Episode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes
             WHERE series_id = $1
             ORDER BY episode_number ASC"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(series_id)
            .fetch_all(pool)
            .await
    }

    /// Return `(series_id, owner_id)` for an episode, or `None` if it does
    /// not exist.
    pub async fn owner_of(pool: &PgPool, id: DbId) -> Result<Option<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT e.series_id, s.owner_id
             FROM episodes e
             JOIN series s ON s.id = e.series_id
             WHERE e.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Update an episode. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEpisode,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!(
            "UPDATE episodes SET
                episode_number = COALESCE($2, episode_number),
                title = COALESCE($3, title),
                synopsis = COALESCE($4, synopsis),
                screenplay = COALESCE($5, screenplay),
                status = COALESCE($6, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .bind(input.episode_number)
            .bind(&input.title)
            .bind(&input.synopsis)
            .bind(&input.screenplay)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete an episode and its segments. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM episodes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
