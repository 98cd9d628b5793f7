//! Handlers for character reference images, nested under
//! `/series/{series_id}/characters/{character_id}/images`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use scenra_core::storage::{
    image_dimensions, object_key, validate_image_upload, KIND_CHARACTER_IMAGE,
};
use scenra_core::types::DbId;
use scenra_db::models::character_image::{CharacterImage, CreateCharacterImage};
use scenra_db::repositories::CharacterImageRepo;

use super::character::find_character;
use super::{read_upload, remove_objects, stream_object};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{data, DataResponse};
use crate::state::AppState;

async fn find_image(state: &AppState, character_id: DbId, id: DbId) -> AppResult<CharacterImage> {
    CharacterImageRepo::find_for_character(&state.pool, character_id, id)
        .await?
        .ok_or(AppError::not_found("CharacterImage", id))
}

/// GET /api/v1/series/{series_id}/characters/{character_id}/images
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, character_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<CharacterImage>>>> {
    find_character(&state, &auth, series_id, character_id).await?;
    let images = CharacterImageRepo::list_by_character(&state.pool, character_id).await?;
    Ok(data(images))
}

/// POST /api/v1/series/{series_id}/characters/{character_id}/images
///
/// Multipart upload with a single `file` field (PNG, JPEG or WebP).
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, character_id)): Path<(DbId, DbId)>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<CharacterImage>>)> {
    find_character(&state, &auth, series_id, character_id).await?;

    let upload = read_upload(multipart).await?;
    let content_type = upload.content_type.unwrap_or_default();
    let ext = validate_image_upload(&content_type, upload.bytes.len())?;
    let dimensions = image_dimensions(&upload.bytes);

    let key = object_key(KIND_CHARACTER_IMAGE, character_id, ext);
    state.storage.put(&key, &upload.bytes).await?;

    let input = CreateCharacterImage {
        character_id,
        storage_key: key.clone(),
        content_type,
        byte_size: upload.bytes.len() as i64,
        width: dimensions.map(|(w, _)| w as i32),
        height: dimensions.map(|(_, h)| h as i32),
    };
    let image = match CharacterImageRepo::create(&state.pool, &input).await {
        Ok(image) => image,
        Err(e) => {
            remove_objects(&state, &[key]).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        image_id = image.id,
        character_id,
        bytes = image.byte_size,
        is_primary = image.is_primary,
        "Character image uploaded"
    );
    Ok((StatusCode::CREATED, data(image)))
}

/// GET /api/v1/series/{series_id}/characters/{character_id}/images/{id}/file
pub async fn file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, character_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Response> {
    find_character(&state, &auth, series_id, character_id).await?;
    let image = find_image(&state, character_id, id).await?;
    stream_object(&state, &image.storage_key, &image.content_type).await
}

/// PUT /api/v1/series/{series_id}/characters/{character_id}/images/{id}/primary
pub async fn set_primary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, character_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<DataResponse<CharacterImage>>> {
    find_character(&state, &auth, series_id, character_id).await?;
    let image = CharacterImageRepo::set_primary(&state.pool, character_id, id)
        .await?
        .ok_or(AppError::not_found("CharacterImage", id))?;
    Ok(data(image))
}

/// DELETE /api/v1/series/{series_id}/characters/{character_id}/images/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((series_id, character_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_character(&state, &auth, series_id, character_id).await?;
    let removed = CharacterImageRepo::delete(&state.pool, character_id, id)
        .await?
        .ok_or(AppError::not_found("CharacterImage", id))?;
    remove_objects(&state, &[removed.storage_key]).await;
    Ok(StatusCode::NO_CONTENT)
}
