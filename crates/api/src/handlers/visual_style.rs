//! Handlers for the per-series visual style at
//! `/series/{series_id}/visual-style`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_core::types::DbId;
use scenra_core::validation::validate_aspect_ratio;
use scenra_db::models::visual_style::{UpsertVisualStyle, VisualStyle};
use scenra_db::repositories::VisualStyleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_series_id;
use crate::response::{data, DataResponse};
use crate::state::AppState;

/// GET /api/v1/series/{series_id}/visual-style
///
/// 404 until a style has been set.
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
) -> AppResult<Json<DataResponse<VisualStyle>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    let style = VisualStyleRepo::find_by_series(&state.pool, series_id)
        .await?
        .ok_or(AppError::not_found("VisualStyle", series_id))?;
    Ok(data(style))
}

/// PUT /api/v1/series/{series_id}/visual-style
///
/// Creates the style or replaces every field of the existing one.
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
    Json(input): Json<UpsertVisualStyle>,
) -> AppResult<Json<DataResponse<VisualStyle>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    if let Some(ratio) = &input.aspect_ratio {
        validate_aspect_ratio(ratio)?;
    }
    let style = VisualStyleRepo::upsert(&state.pool, series_id, &input).await?;
    tracing::info!(series_id, aspect_ratio = %style.aspect_ratio, "Visual style saved");
    Ok(data(style))
}

/// DELETE /api/v1/series/{series_id}/visual-style
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    if VisualStyleRepo::delete_by_series(&state.pool, series_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("VisualStyle", series_id))
    }
}
