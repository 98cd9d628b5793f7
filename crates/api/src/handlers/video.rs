//! Handlers for segment videos, nested under `/segments/{segment_id}/videos`.
//!
//! A video is either a generation job tracked by provider and job id, or a
//! file uploaded directly. Only uploaded videos have a stored file.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use scenra_core::error::CoreError;
use scenra_core::storage::{object_key, validate_video_upload, KIND_SEGMENT_VIDEO};
use scenra_core::types::DbId;
use scenra_core::validation::{validate_video_status, VIDEO_STATUS_COMPLETE};
use scenra_db::models::video::{CreateVideo, UpdateVideo, Video};
use scenra_db::repositories::VideoRepo;

use super::{read_upload, remove_objects, stream_object};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_segment;
use crate::response::{data, DataResponse};
use crate::state::AppState;

fn validate_video_duration(duration: Option<f64>) -> AppResult<()> {
    match duration {
        Some(d) if !d.is_finite() || d <= 0.0 => Err(AppError::Core(CoreError::Validation(
            "duration_secs must be a positive number".into(),
        ))),
        _ => Ok(()),
    }
}

async fn find_video(state: &AppState, segment_id: DbId, id: DbId) -> AppResult<Video> {
    VideoRepo::find_for_segment(&state.pool, segment_id, id)
        .await?
        .ok_or(AppError::not_found("Video", id))
}

/// POST /api/v1/segments/{segment_id}/videos
///
/// Records a generation job. The file, if any, arrives later via upload.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(segment_id): Path<DbId>,
    Json(input): Json<CreateVideo>,
) -> AppResult<(StatusCode, Json<DataResponse<Video>>)> {
    authorize_segment(&state.pool, segment_id, &auth).await?;
    if let Some(status) = &input.status {
        validate_video_status(status)?;
    }
    validate_video_duration(input.duration_secs)?;

    let video = VideoRepo::create(&state.pool, segment_id, &input).await?;
    tracing::info!(
        video_id = video.id,
        segment_id,
        provider = ?video.provider,
        "Video record created"
    );
    Ok((StatusCode::CREATED, data(video)))
}

/// POST /api/v1/segments/{segment_id}/videos/upload
///
/// Multipart upload with a single `file` field (.mp4, .webm or .mov). The
/// stored video is created as `complete`.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(segment_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Video>>)> {
    authorize_segment(&state.pool, segment_id, &auth).await?;

    let upload = read_upload(multipart).await?;
    let file_name = upload.file_name.unwrap_or_default();
    let (ext, content_type) = validate_video_upload(&file_name, upload.bytes.len())?;

    let key = object_key(KIND_SEGMENT_VIDEO, segment_id, ext);
    state.storage.put(&key, &upload.bytes).await?;

    let input = CreateVideo {
        status: Some(VIDEO_STATUS_COMPLETE.to_string()),
        provider: Some("upload".to_string()),
        storage_key: Some(key.clone()),
        content_type: Some(content_type.to_string()),
        byte_size: Some(upload.bytes.len() as i64),
        ..Default::default()
    };
    let video = match VideoRepo::create(&state.pool, segment_id, &input).await {
        Ok(video) => video,
        Err(e) => {
            remove_objects(&state, &[key]).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        video_id = video.id,
        segment_id,
        file_name = %file_name,
        bytes = upload.bytes.len(),
        "Video uploaded"
    );
    Ok((StatusCode::CREATED, data(video)))
}

/// GET /api/v1/segments/{segment_id}/videos
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(segment_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Video>>>> {
    authorize_segment(&state.pool, segment_id, &auth).await?;
    Ok(data(VideoRepo::list_by_segment(&state.pool, segment_id).await?))
}

/// GET /api/v1/segments/{segment_id}/videos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((segment_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Video>>> {
    authorize_segment(&state.pool, segment_id, &auth).await?;
    Ok(data(find_video(&state, segment_id, id).await?))
}

/// PATCH /api/v1/segments/{segment_id}/videos/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((segment_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateVideo>,
) -> AppResult<Json<DataResponse<Video>>> {
    authorize_segment(&state.pool, segment_id, &auth).await?;
    let current = find_video(&state, segment_id, id).await?;
    if let Some(status) = &input.status {
        validate_video_status(status)?;
    }
    validate_video_duration(input.duration_secs)?;

    let video = VideoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Video", id))?;
    if video.status != current.status {
        tracing::info!(
            video_id = id,
            from = %current.status,
            to = %video.status,
            "Video status changed"
        );
    }
    Ok(data(video))
}

/// DELETE /api/v1/segments/{segment_id}/videos/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((segment_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_segment(&state.pool, segment_id, &auth).await?;
    let removed = VideoRepo::delete(&state.pool, segment_id, id)
        .await?
        .ok_or(AppError::not_found("Video", id))?;
    if let Some(key) = removed.storage_key {
        remove_objects(&state, &[key]).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/segments/{segment_id}/videos/{id}/file
///
/// 404 when the video has no stored file.
pub async fn file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((segment_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    authorize_segment(&state.pool, segment_id, &auth).await?;
    let video = find_video(&state, segment_id, id).await?;
    let (Some(key), Some(content_type)) = (&video.storage_key, &video.content_type) else {
        return Err(AppError::not_found("VideoFile", id));
    };
    stream_object(&state, key, content_type).await
}
