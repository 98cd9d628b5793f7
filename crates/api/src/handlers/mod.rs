pub mod auth;
pub mod character;
pub mod character_image;
pub mod episode;
pub mod relationship;
pub mod roundtable;
pub mod screenplay;
pub mod segment;
pub mod series;
pub mod setting;
pub mod video;
pub mod visual_style;

use axum::body::{Body, Bytes};
use axum::extract::Multipart;
use axum::http::header;
use axum::response::Response;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The `file` part of a multipart upload.
pub(crate) struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Pull the `file` field out of a multipart body. Other fields are ignored.
pub(crate) async fn read_upload(mut multipart: Multipart) -> AppResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart data: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::BadRequest(
        "Missing 'file' field in multipart upload".into(),
    ))
}

/// Stream a stored object back to the client.
pub(crate) async fn stream_object(
    state: &AppState,
    key: &str,
    content_type: &str,
) -> AppResult<Response> {
    let (file, len) = state.storage.open(key).await?;
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(format!("Failed to build file response: {e}")))
}

/// Best-effort removal of stored objects after their rows are gone.
///
/// Failures are logged; the database is the source of truth and a
/// leftover file is harmless.
pub(crate) async fn remove_objects(state: &AppState, keys: &[String]) {
    for key in keys {
        if let Err(e) = state.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to remove stored object");
        }
    }
}
