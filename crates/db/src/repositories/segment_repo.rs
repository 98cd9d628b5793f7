//! Repository for the `segments` table.

use scenra_core::types::DbId;
use scenra_core::validation::{segment_statuses_reaching, SEGMENT_STATUS_PROMPT_READY};
use sqlx::PgPool;

use crate::models::segment::{CreateSegment, RoundtableResult, Segment, UpdateSegment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, episode_id, segment_index, title, description, dialogue, \
                       duration_secs, setting_id, character_ids, status, generated_prompt, \
                       shot_list, shots, roundtable_transcript, created_at, updated_at";

const INSERT: &str = "INSERT INTO segments
        (episode_id, segment_index, title, description, dialogue, duration_secs,
         setting_id, character_ids, status)
     VALUES (
        $1,
        COALESCE($2, (SELECT COALESCE(MAX(segment_index), -1) + 1
                      FROM segments WHERE episode_id = $1)),
        $3, $4, $5, COALESCE($6, 5.0), $7,
        COALESCE($8, '{}'::bigint[]), COALESCE($9, 'draft')
     )";

/// Provides CRUD operations for segments plus roundtable persistence.
pub struct SegmentRepo;

impl SegmentRepo {
    /// Insert a new segment.
    ///
    /// If `segment_index` is `None`, the segment is appended after the
    /// highest existing index. Duration defaults to 5 seconds and status to
    /// `draft`.
    pub async fn create(
        pool: &PgPool,
        episode_id: DbId,
        input: &CreateSegment,
    ) -> Result<Segment, sqlx::Error> {
        let query = format!("{INSERT} RETURNING {COLUMNS}");
        sqlx::query_as::<_, Segment>(&query)
            .bind(episode_id)
            .bind(input.segment_index)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.dialogue)
            .bind(input.duration_secs)
            .bind(input.setting_id)
            .bind(&input.character_ids)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Replace all segments of an episode in one transaction.
    ///
    /// With `replace == false` the call fails with `Ok(None)` when the
    /// episode already has segments and nothing is written.
    pub async fn replace_for_episode(
        pool: &PgPool,
        episode_id: DbId,
        inputs: &[CreateSegment],
        replace: bool,
    ) -> Result<Option<Vec<Segment>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serialises concurrent conversions of the same episode.
        sqlx::query("SELECT id FROM episodes WHERE id = $1 FOR UPDATE")
            .bind(episode_id)
            .execute(&mut *tx)
            .await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM segments WHERE episode_id = $1")
                .bind(episode_id)
                .fetch_one(&mut *tx)
                .await?;
        if existing > 0 {
            if !replace {
                tx.rollback().await?;
                return Ok(None);
            }
            sqlx::query("DELETE FROM segments WHERE episode_id = $1")
                .bind(episode_id)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!("{INSERT} RETURNING {COLUMNS}");
        let mut created = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let segment = sqlx::query_as::<_, Segment>(&query)
                .bind(episode_id)
                .bind(input.segment_index.unwrap_or(index as i32))
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.dialogue)
                .bind(input.duration_secs)
                .bind(input.setting_id)
                .bind(&input.character_ids)
                .bind(&input.status)
                .fetch_one(&mut *tx)
                .await?;
            created.push(segment);
        }

        tx.commit().await?;
        Ok(Some(created))
    }

    /// Find a segment only if it belongs to `episode_id`.
    pub async fn find_in_episode(
        pool: &PgPool,
        episode_id: DbId,
        id: DbId,
    ) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM segments WHERE id = $1 AND episode_id = $2");
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .bind(episode_id)
            .fetch_optional(pool)
            .await
    }

    /// List all segments of an episode ordered by index.
    pub async fn list_by_episode(
        pool: &PgPool,
        episode_id: DbId,
    ) -> Result<Vec<Segment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM segments
             WHERE episode_id = $1
             ORDER BY segment_index ASC"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(episode_id)
            .fetch_all(pool)
            .await
    }

    /// Return `(series_id, owner_id)` for a segment, or `None` if it does not
    /// exist.
    pub async fn owner_of(pool: &PgPool, id: DbId) -> Result<Option<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT s.id, s.owner_id
             FROM segments sg
             JOIN episodes e ON e.id = sg.episode_id
             JOIN series s ON s.id = e.series_id
             WHERE sg.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Update a segment. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSegment,
    ) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!(
            "UPDATE segments SET
                segment_index = COALESCE($2, segment_index),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                dialogue = COALESCE($5, dialogue),
                duration_secs = COALESCE($6, duration_secs),
                setting_id = COALESCE($7, setting_id),
                character_ids = COALESCE($8, character_ids),
                status = COALESCE($9, status),
                generated_prompt = COALESCE($10, generated_prompt)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .bind(input.segment_index)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.dialogue)
            .bind(input.duration_secs)
            .bind(input.setting_id)
            .bind(&input.character_ids)
            .bind(&input.status)
            .bind(&input.generated_prompt)
            .fetch_optional(pool)
            .await
    }

    /// Persist a finished roundtable and mark the segment `prompt_ready`.
    ///
    /// Returns `None` when the segment is gone or its current status may not
    /// move to `prompt_ready`.
    pub async fn save_roundtable_result(
        pool: &PgPool,
        id: DbId,
        result: &RoundtableResult,
    ) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!(
            "UPDATE segments SET
                generated_prompt = $2,
                shot_list = $3,
                shots = $4,
                roundtable_transcript = $5,
                status = $6
             WHERE id = $1 AND status = ANY($7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .bind(&result.generated_prompt)
            .bind(&result.shot_list)
            .bind(&result.shots)
            .bind(&result.transcript)
            .bind(SEGMENT_STATUS_PROMPT_READY)
            .bind(segment_statuses_reaching(SEGMENT_STATUS_PROMPT_READY))
            .fetch_optional(pool)
            .await
    }

    /// Delete a segment and its videos. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM segments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
