//! Route definitions for episode-scoped resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{roundtable, screenplay, segment};
use crate::state::AppState;

/// Routes mounted at `/episodes`.
///
/// ```text
/// GET    /{episode_id}/segments                  -> list
/// POST   /{episode_id}/segments                  -> create
/// POST   /{episode_id}/segments/generate         -> screenplay conversion
/// GET    /{episode_id}/segments/{id}             -> get_by_id
/// PATCH  /{episode_id}/segments/{id}             -> update
/// DELETE /{episode_id}/segments/{id}             -> delete
/// POST   /{episode_id}/segments/{id}/roundtable  -> NDJSON roundtable stream
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{episode_id}/segments",
            get(segment::list).post(segment::create),
        )
        .route(
            "/{episode_id}/segments/generate",
            post(screenplay::generate),
        )
        .route(
            "/{episode_id}/segments/{id}",
            get(segment::get_by_id)
                .patch(segment::update)
                .delete(segment::delete),
        )
        .route(
            "/{episode_id}/segments/{id}/roundtable",
            post(roundtable::run),
        )
}
