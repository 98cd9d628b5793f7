//! Route definitions for the `/series` resource.
//!
//! Everything owned by a series (episodes, characters and their images,
//! settings, relationships, visual style) is nested under
//! `/series/{series_id}/...`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{
    character, character_image, episode, relationship, series, setting, visual_style,
};
use crate::state::AppState;

/// Routes mounted at `/series`.
///
/// ```text
/// GET    /                                                  -> list
/// POST   /                                                  -> create
/// GET    /{id}                                              -> get_by_id
/// PATCH  /{id}                                              -> update
/// DELETE /{id}                                              -> delete
///
/// GET    /{series_id}/episodes                              -> list
/// POST   /{series_id}/episodes                              -> create
/// GET    /{series_id}/episodes/{id}                         -> get_by_id
/// PATCH  /{series_id}/episodes/{id}                         -> update
/// DELETE /{series_id}/episodes/{id}                         -> delete
///
/// GET    /{series_id}/characters                            -> list
/// POST   /{series_id}/characters                            -> create
/// GET    /{series_id}/characters/{id}                       -> get_by_id
/// PATCH  /{series_id}/characters/{id}                       -> update
/// DELETE /{series_id}/characters/{id}                       -> delete
/// GET    /{series_id}/characters/{id}/relationships         -> list_relationships
/// POST   /{series_id}/characters/{id}/analyze               -> analyze
/// GET    /{series_id}/characters/{id}/images                -> list
/// POST   /{series_id}/characters/{id}/images                -> upload (multipart)
/// DELETE /{series_id}/characters/{id}/images/{image_id}     -> delete
/// GET    /{series_id}/characters/{id}/images/{image_id}/file     -> file
/// PUT    /{series_id}/characters/{id}/images/{image_id}/primary  -> set_primary
///
/// GET    /{series_id}/settings                              -> list
/// POST   /{series_id}/settings                              -> create
/// GET    /{series_id}/settings/{id}                         -> get_by_id
/// PATCH  /{series_id}/settings/{id}                         -> update
/// DELETE /{series_id}/settings/{id}                         -> delete
///
/// GET    /{series_id}/relationships                         -> list
/// POST   /{series_id}/relationships                         -> create
/// GET    /{series_id}/relationships/{id}                    -> get_by_id
/// PATCH  /{series_id}/relationships/{id}                    -> update
/// DELETE /{series_id}/relationships/{id}                    -> delete
///
/// GET    /{series_id}/visual-style                          -> get
/// PUT    /{series_id}/visual-style                          -> upsert
/// DELETE /{series_id}/visual-style                          -> delete
/// ```
pub fn router() -> Router<AppState> {
    let episode_routes = Router::new()
        .route("/", get(episode::list).post(episode::create))
        .route(
            "/{id}",
            get(episode::get_by_id)
                .patch(episode::update)
                .delete(episode::delete),
        );

    let character_routes = Router::new()
        .route("/", get(character::list).post(character::create))
        .route(
            "/{id}",
            get(character::get_by_id)
                .patch(character::update)
                .delete(character::delete),
        )
        .route("/{id}/relationships", get(character::list_relationships))
        .route("/{id}/analyze", post(character::analyze))
        .route(
            "/{id}/images",
            get(character_image::list).post(character_image::upload),
        )
        .route(
            "/{id}/images/{image_id}",
            axum::routing::delete(character_image::delete),
        )
        .route("/{id}/images/{image_id}/file", get(character_image::file))
        .route(
            "/{id}/images/{image_id}/primary",
            put(character_image::set_primary),
        );

    let setting_routes = Router::new()
        .route("/", get(setting::list).post(setting::create))
        .route(
            "/{id}",
            get(setting::get_by_id)
                .patch(setting::update)
                .delete(setting::delete),
        );

    let relationship_routes = Router::new()
        .route("/", get(relationship::list).post(relationship::create))
        .route(
            "/{id}",
            get(relationship::get_by_id)
                .patch(relationship::update)
                .delete(relationship::delete),
        );

    Router::new()
        .route("/", get(series::list).post(series::create))
        .route(
            "/{id}",
            get(series::get_by_id)
                .patch(series::update)
                .delete(series::delete),
        )
        .route(
            "/{series_id}/visual-style",
            get(visual_style::get)
                .put(visual_style::upsert)
                .delete(visual_style::delete),
        )
        .nest("/{series_id}/episodes", episode_routes)
        .nest("/{series_id}/characters", character_routes)
        .nest("/{series_id}/settings", setting_routes)
        .nest("/{series_id}/relationships", relationship_routes)
}
