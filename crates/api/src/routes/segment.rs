//! Route definitions for segment-scoped resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

/// Routes mounted at `/segments`.
///
/// ```text
/// GET    /{segment_id}/videos            -> list
/// POST   /{segment_id}/videos            -> create (generation job record)
/// POST   /{segment_id}/videos/upload     -> upload (multipart)
/// GET    /{segment_id}/videos/{id}       -> get_by_id
/// PATCH  /{segment_id}/videos/{id}       -> update
/// DELETE /{segment_id}/videos/{id}       -> delete
/// GET    /{segment_id}/videos/{id}/file  -> file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{segment_id}/videos",
            get(video::list).post(video::create),
        )
        .route("/{segment_id}/videos/upload", post(video::upload))
        .route(
            "/{segment_id}/videos/{id}",
            get(video::get_by_id)
                .patch(video::update)
                .delete(video::delete),
        )
        .route("/{segment_id}/videos/{id}/file", get(video::file))
}
