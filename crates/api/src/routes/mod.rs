pub mod auth;
pub mod episode;
pub mod health;
pub mod segment;
pub mod series;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register, /auth/login, /auth/refresh         public
/// /auth/logout, /auth/me                             requires auth
///
/// /series                                            list, create
/// /series/{id}                                       get, update, delete
/// /series/{series_id}/episodes[/{id}]                episodes
/// /series/{series_id}/characters[/{id}]              characters
/// /series/{series_id}/characters/{id}/images[...]    reference images
/// /series/{series_id}/characters/{id}/analyze        vision analysis
/// /series/{series_id}/settings[/{id}]                settings
/// /series/{series_id}/relationships[/{id}]           relationships
/// /series/{series_id}/visual-style                   get, upsert, delete
///
/// /episodes/{episode_id}/segments[/{id}]             segments
/// /episodes/{episode_id}/segments/generate           screenplay conversion
/// /episodes/{episode_id}/segments/{id}/roundtable    NDJSON roundtable stream
///
/// /segments/{segment_id}/videos[/{id}]               videos
/// /segments/{segment_id}/videos/upload               video upload
/// /segments/{segment_id}/videos/{id}/file            video download
/// ```
///
/// Everything except the public auth routes requires a bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/series", series::router())
        .nest("/episodes", episode::router())
        .nest("/segments", segment::router())
}
