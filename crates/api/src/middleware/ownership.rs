//! Ownership checks.
//!
//! Every resource belongs to a series, and the series belongs to one user.
//! A missing resource is 404; a resource owned by someone else is 403.

use scenra_core::error::CoreError;
use scenra_core::types::DbId;
use scenra_db::models::episode::Episode;
use scenra_db::models::series::Series;
use scenra_db::repositories::{EpisodeRepo, SegmentRepo, SeriesRepo};
use sqlx::PgPool;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};

fn ensure_owner(owner_id: DbId, auth: &AuthUser, entity: &str) -> AppResult<()> {
    if owner_id == auth.user_id {
        Ok(())
    } else {
        tracing::warn!(
            user_id = auth.user_id,
            entity,
            "Access to another user's resource denied"
        );
        Err(AppError::Core(CoreError::Forbidden(format!(
            "You do not have access to this {entity}"
        ))))
    }
}

/// Load a series the caller owns.
pub async fn authorize_series(
    pool: &PgPool,
    series_id: DbId,
    auth: &AuthUser,
) -> AppResult<Series> {
    let series = SeriesRepo::find_by_id(pool, series_id)
        .await?
        .ok_or(AppError::not_found("Series", series_id))?;
    ensure_owner(series.owner_id, auth, "series")?;
    Ok(series)
}

/// Check ownership of a series without loading it.
pub async fn authorize_series_id(
    pool: &PgPool,
    series_id: DbId,
    auth: &AuthUser,
) -> AppResult<()> {
    let owner_id = SeriesRepo::owner_of(pool, series_id)
        .await?
        .ok_or(AppError::not_found("Series", series_id))?;
    ensure_owner(owner_id, auth, "series")
}

/// Load an episode whose series the caller owns.
pub async fn authorize_episode(
    pool: &PgPool,
    episode_id: DbId,
    auth: &AuthUser,
) -> AppResult<Episode> {
    let (_series_id, owner_id) = EpisodeRepo::owner_of(pool, episode_id)
        .await?
        .ok_or(AppError::not_found("Episode", episode_id))?;
    ensure_owner(owner_id, auth, "episode")?;
    EpisodeRepo::find_by_id(pool, episode_id)
        .await?
        .ok_or(AppError::not_found("Episode", episode_id))
}

/// Check that the caller owns the series above a segment. Returns the
/// series id.
pub async fn authorize_segment(
    pool: &PgPool,
    segment_id: DbId,
    auth: &AuthUser,
) -> AppResult<DbId> {
    let (series_id, owner_id) = SegmentRepo::owner_of(pool, segment_id)
        .await?
        .ok_or(AppError::not_found("Segment", segment_id))?;
    ensure_owner(owner_id, auth, "segment")?;
    Ok(series_id)
}
