//! Repository for the `videos` table.

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::video::{CreateVideo, UpdateVideo, Video};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, segment_id, status, provider, external_job_id, storage_key, \
                       content_type, byte_size, duration_secs, error_message, created_at, updated_at";

/// Provides CRUD operations for segment videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video record. If `status` is `None`, defaults to `queued`.
    pub async fn create(
        pool: &PgPool,
        segment_id: DbId,
        input: &CreateVideo,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (segment_id, status, provider, external_job_id, storage_key,
                 content_type, byte_size, duration_secs)
             VALUES ($1, COALESCE($2, 'queued'), $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(segment_id)
            .bind(&input.status)
            .bind(&input.provider)
            .bind(&input.external_job_id)
            .bind(&input.storage_key)
            .bind(&input.content_type)
            .bind(input.byte_size)
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }

    /// Find a video only if it belongs to `segment_id`.
    pub async fn find_for_segment(
        pool: &PgPool,
        segment_id: DbId,
        id: DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND segment_id = $2");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(segment_id)
            .fetch_optional(pool)
            .await
    }

    /// List a segment's videos, newest first.
    pub async fn list_by_segment(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE segment_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(segment_id)
            .fetch_all(pool)
            .await
    }

    /// Update a video. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                status = COALESCE($2, status),
                provider = COALESCE($3, provider),
                external_job_id = COALESCE($4, external_job_id),
                duration_secs = COALESCE($5, duration_secs),
                error_message = COALESCE($6, error_message)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(&input.provider)
            .bind(&input.external_job_id)
            .bind(input.duration_secs)
            .bind(&input.error_message)
            .fetch_optional(pool)
            .await
    }

    /// Delete a video, returning the removed row so the caller can delete
    /// its stored file.
    pub async fn delete(
        pool: &PgPool,
        segment_id: DbId,
        id: DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "DELETE FROM videos WHERE id = $1 AND segment_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(segment_id)
            .fetch_optional(pool)
            .await
    }

    /// Storage keys of every stored video of a segment.
    pub async fn keys_for_segment(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT storage_key FROM videos
             WHERE segment_id = $1 AND storage_key IS NOT NULL",
        )
        .bind(segment_id)
        .fetch_all(pool)
        .await
    }

    /// Storage keys of every stored video in an episode.
    pub async fn keys_for_episode(
        pool: &PgPool,
        episode_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT v.storage_key
             FROM videos v
             JOIN segments sg ON sg.id = v.segment_id
             WHERE sg.episode_id = $1 AND v.storage_key IS NOT NULL",
        )
        .bind(episode_id)
        .fetch_all(pool)
        .await
    }

    /// Storage keys of every stored video in a series.
    pub async fn keys_for_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT v.storage_key
             FROM videos v
             JOIN segments sg ON sg.id = v.segment_id
             JOIN episodes e ON e.id = sg.episode_id
             WHERE e.series_id = $1 AND v.storage_key IS NOT NULL",
        )
        .bind(series_id)
        .fetch_all(pool)
        .await
    }
}
