//! Handlers for character relationships, nested under
//! `/series/{series_id}/relationships`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_core::error::CoreError;
use scenra_core::types::DbId;
use scenra_core::validation::validate_relationship_type;
use scenra_db::models::relationship::{
    CreateRelationship, RelationshipWithNames, UpdateRelationship,
};
use scenra_db::repositories::{CharacterRepo, RelationshipRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_series_id;
use crate::response::{data, DataResponse};
use crate::state::AppState;

async fn find_relationship(
    state: &AppState,
    series_id: DbId,
    id: DbId,
) -> AppResult<RelationshipWithNames> {
    RelationshipRepo::find_in_series(&state.pool, series_id, id)
        .await?
        .ok_or(AppError::not_found("Relationship", id))
}

/// POST /api/v1/series/{series_id}/relationships
///
/// The pair is unordered: `(a, b)` and `(b, a)` are the same relationship
/// and the second insert answers 409.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
    Json(input): Json<CreateRelationship>,
) -> AppResult<(StatusCode, Json<DataResponse<RelationshipWithNames>>)> {
    authorize_series_id(&state.pool, series_id, &auth).await?;

    if input.character_a_id == input.character_b_id {
        return Err(AppError::Core(CoreError::Validation(
            "A character cannot have a relationship with itself".into(),
        )));
    }
    validate_relationship_type(&input.relationship_type)?;

    let pair = [input.character_a_id, input.character_b_id];
    if CharacterRepo::count_in_series(&state.pool, series_id, &pair).await? != 2 {
        return Err(AppError::Core(CoreError::Validation(
            "Both characters must belong to this series".into(),
        )));
    }

    let created = RelationshipRepo::create(&state.pool, series_id, &input).await?;
    tracing::info!(
        relationship_id = created.id,
        series_id,
        relationship_type = %created.relationship_type,
        "Relationship created"
    );
    let relationship = find_relationship(&state, series_id, created.id).await?;
    Ok((StatusCode::CREATED, data(relationship)))
}

/// GET /api/v1/series/{series_id}/relationships
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RelationshipWithNames>>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    Ok(data(RelationshipRepo::list_by_series(&state.pool, series_id).await?))
}

/// GET /api/v1/series/{series_id}/relationships/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<RelationshipWithNames>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    Ok(data(find_relationship(&state, series_id, id).await?))
}

/// PATCH /api/v1/series/{series_id}/relationships/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateRelationship>,
) -> AppResult<Json<DataResponse<RelationshipWithNames>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    find_relationship(&state, series_id, id).await?;
    if let Some(relationship_type) = &input.relationship_type {
        validate_relationship_type(relationship_type)?;
    }

    RelationshipRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Relationship", id))?;
    Ok(data(find_relationship(&state, series_id, id).await?))
}

/// DELETE /api/v1/series/{series_id}/relationships/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    find_relationship(&state, series_id, id).await?;
    if RelationshipRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Relationship", id))
    }
}
