//! Handlers for the `/series` resource.
//!
//! A series is the root of ownership: every other resource is reached
//! through one and inherits its `owner_id`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_core::types::DbId;
use scenra_core::validation::{validate_required_text, MAX_TITLE_LEN};
use scenra_db::models::series::{CreateSeries, Series, UpdateSeries};
use scenra_db::repositories::{CharacterImageRepo, SeriesRepo, VideoRepo};

use super::remove_objects;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_series;
use crate::response::{data, DataResponse};
use crate::state::AppState;

/// POST /api/v1/series
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateSeries>,
) -> AppResult<(StatusCode, Json<DataResponse<Series>>)> {
    validate_required_text("title", &input.title, MAX_TITLE_LEN)?;
    let series = SeriesRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(series_id = series.id, user_id = auth.user_id, "Series created");
    Ok((StatusCode::CREATED, data(series)))
}

/// GET /api/v1/series
///
/// Only the caller's own series.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Series>>>> {
    let series = SeriesRepo::list_by_owner(&state.pool, auth.user_id).await?;
    Ok(data(series))
}

/// GET /api/v1/series/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Series>>> {
    let series = authorize_series(&state.pool, id, &auth).await?;
    Ok(data(series))
}

/// PATCH /api/v1/series/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSeries>,
) -> AppResult<Json<DataResponse<Series>>> {
    authorize_series(&state.pool, id, &auth).await?;
    if let Some(title) = &input.title {
        validate_required_text("title", title, MAX_TITLE_LEN)?;
    }
    let series = SeriesRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Series", id))?;
    Ok(data(series))
}

/// DELETE /api/v1/series/{id}
///
/// Cascades to every episode, character, setting and segment in the series
/// and removes their stored files.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_series(&state.pool, id, &auth).await?;

    let mut keys = CharacterImageRepo::keys_for_series(&state.pool, id).await?;
    keys.extend(VideoRepo::keys_for_series(&state.pool, id).await?);

    if !SeriesRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Series", id));
    }
    remove_objects(&state, &keys).await;
    tracing::info!(series_id = id, files = keys.len(), "Series deleted");
    Ok(StatusCode::NO_CONTENT)
}
