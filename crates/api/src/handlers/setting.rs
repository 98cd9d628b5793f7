//! Handlers for settings (locations), nested under
//! `/series/{series_id}/settings`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_core::types::DbId;
use scenra_core::validation::{
    validate_required_text, validate_setting_type, validate_time_of_day, MAX_NAME_LEN,
};
use scenra_db::models::setting::{CreateSetting, Setting, UpdateSetting};
use scenra_db::repositories::SettingRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_series_id;
use crate::response::{data, DataResponse};
use crate::state::AppState;

fn validate_enums(setting_type: Option<&str>, time_of_day: Option<&str>) -> AppResult<()> {
    if let Some(t) = setting_type {
        validate_setting_type(t)?;
    }
    if let Some(t) = time_of_day {
        validate_time_of_day(t)?;
    }
    Ok(())
}

/// POST /api/v1/series/{series_id}/settings
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
    Json(input): Json<CreateSetting>,
) -> AppResult<(StatusCode, Json<DataResponse<Setting>>)> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    validate_required_text("name", &input.name, MAX_NAME_LEN)?;
    validate_enums(input.setting_type.as_deref(), input.time_of_day.as_deref())?;

    let setting = SettingRepo::create(&state.pool, series_id, &input).await?;
    tracing::info!(setting_id = setting.id, series_id, "Setting created");
    Ok((StatusCode::CREATED, data(setting)))
}

/// GET /api/v1/series/{series_id}/settings
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Setting>>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    Ok(data(SettingRepo::list_by_series(&state.pool, series_id).await?))
}

/// GET /api/v1/series/{series_id}/settings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Setting>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    let setting = SettingRepo::find_in_series(&state.pool, series_id, id)
        .await?
        .ok_or(AppError::not_found("Setting", id))?;
    Ok(data(setting))
}

/// PATCH /api/v1/series/{series_id}/settings/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSetting>,
) -> AppResult<Json<DataResponse<Setting>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    SettingRepo::find_in_series(&state.pool, series_id, id)
        .await?
        .ok_or(AppError::not_found("Setting", id))?;

    if let Some(name) = &input.name {
        validate_required_text("name", name, MAX_NAME_LEN)?;
    }
    validate_enums(input.setting_type.as_deref(), input.time_of_day.as_deref())?;

    let setting = SettingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Setting", id))?;
    Ok(data(setting))
}

/// DELETE /api/v1/series/{series_id}/settings/{id}
///
/// Segments placed in this setting keep existing with no setting.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    SettingRepo::find_in_series(&state.pool, series_id, id)
        .await?
        .ok_or(AppError::not_found("Setting", id))?;

    if SettingRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Setting", id))
    }
}
