//! Handlers for segments, nested under `/episodes/{episode_id}/segments`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_core::error::CoreError;
use scenra_core::types::DbId;
use scenra_core::validation::{
    validate_duration_secs, validate_required_text, validate_segment_status,
    validate_segment_transition, MAX_TITLE_LEN,
};
use scenra_db::models::segment::{CreateSegment, Segment, UpdateSegment};
use scenra_db::repositories::{CharacterRepo, SegmentRepo, SettingRepo, VideoRepo};

use super::remove_objects;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_episode;
use crate::response::{data, DataResponse};
use crate::state::AppState;

/// Load a segment through its episode, checking ownership of the series.
pub(crate) async fn find_segment(
    state: &AppState,
    auth: &AuthUser,
    episode_id: DbId,
    id: DbId,
) -> AppResult<(DbId, Segment)> {
    let episode = authorize_episode(&state.pool, episode_id, auth).await?;
    let segment = SegmentRepo::find_in_episode(&state.pool, episode_id, id)
        .await?
        .ok_or(AppError::not_found("Segment", id))?;
    Ok((episode.series_id, segment))
}

/// Check that a referenced setting and characters belong to `series_id`.
pub(crate) async fn validate_references(
    state: &AppState,
    series_id: DbId,
    setting_id: Option<DbId>,
    character_ids: Option<&[DbId]>,
) -> AppResult<()> {
    if let Some(setting_id) = setting_id {
        if SettingRepo::find_in_series(&state.pool, series_id, setting_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Setting {setting_id} does not belong to this series"
            ))));
        }
    }

    if let Some(ids) = character_ids {
        let mut distinct = ids.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        let found = CharacterRepo::count_in_series(&state.pool, series_id, &distinct).await?;
        if found != distinct.len() as i64 {
            return Err(AppError::Core(CoreError::Validation(
                "Every character in character_ids must belong to this series".into(),
            )));
        }
    }
    Ok(())
}

fn validate_index(index: Option<i32>) -> AppResult<()> {
    match index {
        Some(i) if i < 0 => Err(AppError::Core(CoreError::Validation(
            "segment_index must not be negative".into(),
        ))),
        _ => Ok(()),
    }
}

/// POST /api/v1/episodes/{episode_id}/segments
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(episode_id): Path<DbId>,
    Json(input): Json<CreateSegment>,
) -> AppResult<(StatusCode, Json<DataResponse<Segment>>)> {
    let episode = authorize_episode(&state.pool, episode_id, &auth).await?;

    validate_required_text("title", &input.title, MAX_TITLE_LEN)?;
    validate_index(input.segment_index)?;
    if let Some(duration) = input.duration_secs {
        validate_duration_secs(duration)?;
    }
    if let Some(status) = &input.status {
        validate_segment_status(status)?;
    }
    validate_references(
        &state,
        episode.series_id,
        input.setting_id,
        input.character_ids.as_deref(),
    )
    .await?;

    let segment = SegmentRepo::create(&state.pool, episode_id, &input).await?;
    tracing::info!(
        segment_id = segment.id,
        episode_id,
        segment_index = segment.segment_index,
        "Segment created"
    );
    Ok((StatusCode::CREATED, data(segment)))
}

/// GET /api/v1/episodes/{episode_id}/segments
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(episode_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Segment>>>> {
    authorize_episode(&state.pool, episode_id, &auth).await?;
    Ok(data(SegmentRepo::list_by_episode(&state.pool, episode_id).await?))
}

/// GET /api/v1/episodes/{episode_id}/segments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((episode_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Segment>>> {
    let (_, segment) = find_segment(&state, &auth, episode_id, id).await?;
    Ok(data(segment))
}

/// PATCH /api/v1/episodes/{episode_id}/segments/{id}
///
/// Status changes must follow the segment lifecycle.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((episode_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSegment>,
) -> AppResult<Json<DataResponse<Segment>>> {
    let (series_id, current) = find_segment(&state, &auth, episode_id, id).await?;

    if let Some(title) = &input.title {
        validate_required_text("title", title, MAX_TITLE_LEN)?;
    }
    validate_index(input.segment_index)?;
    if let Some(duration) = input.duration_secs {
        validate_duration_secs(duration)?;
    }
    if let Some(status) = &input.status {
        validate_segment_transition(&current.status, status)?;
    }
    validate_references(
        &state,
        series_id,
        input.setting_id,
        input.character_ids.as_deref(),
    )
    .await?;

    let segment = SegmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Segment", id))?;
    if segment.status != current.status {
        tracing::info!(
            segment_id = id,
            from = %current.status,
            to = %segment.status,
            "Segment status changed"
        );
    }
    Ok(data(segment))
}

/// DELETE /api/v1/episodes/{episode_id}/segments/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((episode_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_segment(&state, &auth, episode_id, id).await?;

    let keys = VideoRepo::keys_for_segment(&state.pool, id).await?;
    if !SegmentRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Segment", id));
    }
    remove_objects(&state, &keys).await;
    Ok(StatusCode::NO_CONTENT)
}
