//! Handlers for characters, nested under `/series/{series_id}/characters`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_ai::vision::{self, CharacterBrief, ImageInput, MAX_ANALYSIS_IMAGES};
use scenra_core::types::DbId;
use scenra_core::validation::{validate_character_role, validate_required_text, MAX_NAME_LEN};
use scenra_db::models::character::{Character, CreateCharacter, UpdateCharacter};
use scenra_db::models::relationship::RelationshipWithNames;
use scenra_db::repositories::{CharacterImageRepo, CharacterRepo, RelationshipRepo};

use super::remove_objects;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_series_id;
use crate::response::{data, DataResponse};
use crate::state::AppState;

/// Load a character of a series the caller owns.
pub(crate) async fn find_character(
    state: &AppState,
    auth: &AuthUser,
    series_id: DbId,
    id: DbId,
) -> AppResult<Character> {
    authorize_series_id(&state.pool, series_id, auth).await?;
    CharacterRepo::find_in_series(&state.pool, series_id, id)
        .await?
        .ok_or(AppError::not_found("Character", id))
}

/// POST /api/v1/series/{series_id}/characters
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
    Json(input): Json<CreateCharacter>,
) -> AppResult<(StatusCode, Json<DataResponse<Character>>)> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    validate_required_text("name", &input.name, MAX_NAME_LEN)?;
    if let Some(role) = &input.role {
        validate_character_role(role)?;
    }

    let character = CharacterRepo::create(&state.pool, series_id, &input).await?;
    tracing::info!(character_id = character.id, series_id, "Character created");
    Ok((StatusCode::CREATED, data(character)))
}

/// GET /api/v1/series/{series_id}/characters
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Character>>>> {
    authorize_series_id(&state.pool, series_id, &auth).await?;
    Ok(data(CharacterRepo::list_by_series(&state.pool, series_id).await?))
}

/// GET /api/v1/series/{series_id}/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Character>>> {
    Ok(data(find_character(&state, &auth, series_id, id).await?))
}

/// PATCH /api/v1/series/{series_id}/characters/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCharacter>,
) -> AppResult<Json<DataResponse<Character>>> {
    find_character(&state, &auth, series_id, id).await?;
    if let Some(name) = &input.name {
        validate_required_text("name", name, MAX_NAME_LEN)?;
    }
    if let Some(role) = &input.role {
        validate_character_role(role)?;
    }

    let character = CharacterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Character", id))?;
    Ok(data(character))
}

/// DELETE /api/v1/series/{series_id}/characters/{id}
///
/// Removes the character's images and relationships as well.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_character(&state, &auth, series_id, id).await?;

    let keys = CharacterImageRepo::keys_for_character(&state.pool, id).await?;
    if !CharacterRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Character", id));
    }
    remove_objects(&state, &keys).await;
    tracing::info!(character_id = id, series_id, "Character deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/series/{series_id}/characters/{id}/relationships
pub async fn list_relationships(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<RelationshipWithNames>>>> {
    find_character(&state, &auth, series_id, id).await?;
    Ok(data(RelationshipRepo::list_for_character(&state.pool, id).await?))
}

/// POST /api/v1/series/{series_id}/characters/{id}/analyze
///
/// Sends the character's reference images (primary first) to the vision
/// model and stores the resulting visual fingerprint on the character.
pub async fn analyze(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Character>>> {
    let character = find_character(&state, &auth, series_id, id).await?;
    let llm = state.llm()?;

    let images = CharacterImageRepo::list_by_character(&state.pool, id).await?;
    if images.is_empty() {
        return Err(AppError::BadRequest(
            "Upload at least one reference image before analysis".into(),
        ));
    }

    let mut inputs = Vec::with_capacity(images.len().min(MAX_ANALYSIS_IMAGES));
    for image in images.iter().take(MAX_ANALYSIS_IMAGES) {
        inputs.push(ImageInput {
            media_type: image.content_type.clone(),
            bytes: state.storage.read(&image.storage_key).await?,
        });
    }

    let brief = CharacterBrief {
        name: character.name.clone(),
        role: character.role.clone(),
        description: character.description.clone(),
        appearance: character.appearance.clone(),
    };
    let fingerprint = vision::analyze_character(llm.as_ref(), &brief, &inputs).await?;
    let value = serde_json::to_value(&fingerprint)
        .map_err(|e| AppError::InternalError(format!("Failed to encode fingerprint: {e}")))?;

    let updated = CharacterRepo::set_visual_fingerprint(&state.pool, id, &value)
        .await?
        .ok_or(AppError::not_found("Character", id))?;
    tracing::info!(
        character_id = id,
        images = inputs.len(),
        "Character visual fingerprint stored"
    );
    Ok(data(updated))
}
