//! Handlers for episodes, nested under `/series/{series_id}/episodes`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_core::error::CoreError;
use scenra_core::types::DbId;
use scenra_core::validation::{validate_episode_status, validate_required_text, MAX_TITLE_LEN};
use scenra_db::models::episode::{CreateEpisode, Episode, UpdateEpisode};
use scenra_db::repositories::{EpisodeRepo, VideoRepo};

use super::remove_objects;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_series_id;
use crate::response::{data, DataResponse};
use crate::state::AppState;

fn validate_episode_number(number: Option<i32>) -> AppResult<()> {
    match number {
        Some(n) if n < 1 => Err(AppError::Core(CoreError::Validation(
            "episode_number must be at least 1".to_string(),
        ))),
        _ => Ok(()),
    }
}

async fn find_episode(state: &AppState, series_id: DbId, id: DbId) -> AppResult<Episode> {
    EpisodeRepo::find_in_series(&state.pool, series_id, id)
        .await?
        .ok_or(AppError::not_found("Episode", id))
}

/// POST /api/v1/series/{series_id}/episodes
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
    Json(input): Json<CreateEpisode>,
) -> AppResult<(StatusCode, Json<DataResponse<Episode>>)> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    validate_required_text("title", &input.title, MAX_TITLE_LEN)?;
    validate_episode_number(input.episode_number)?;
    if let Some(status) = &input.status {
        validate_episode_status(status)?;
    }

    let episode = EpisodeRepo::create(&state.pool, series_id, &input).await?;
    tracing::info!(
        episode_id = episode.id,
        series_id,
        episode_number = episode.episode_number,
        "Episode created"
    );
    Ok((StatusCode::CREATED, data(episode)))
}

/// GET /api/v1/series/{series_id}/episodes
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Episode>>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    let episodes = EpisodeRepo::list_by_series(&state.pool, series_id).await?;
    Ok(data(episodes))
}

/// GET /api/v1/series/{series_id}/episodes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Episode>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    Ok(data(find_episode(&state, series_id, id).await?))
}

/// PATCH /api/v1/series/{series_id}/episodes/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateEpisode>,
) -> AppResult<Json<DataResponse<Episode>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    find_episode(&state, series_id, id).await?;

    if let Some(title) = &input.title {
        validate_required_text("title", title, MAX_TITLE_LEN)?;
    }
    validate_episode_number(input.episode_number)?;
    if let Some(status) = &input.status {
        validate_episode_status(status)?;
    }

    let episode = EpisodeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Episode", id))?;
    Ok(data(episode))
}

/// DELETE /api/v1/series/{series_id}/episodes/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    find_episode(&state, series_id, id).await?;

    let keys = VideoRepo::keys_for_episode(&state.pool, id).await?;
    if !EpisodeRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Episode", id));
    }
    remove_objects(&state, &keys).await;
    tracing::info!(episode_id = id, series_id, "Episode deleted");
    Ok(StatusCode::NO_CONTENT)
}
