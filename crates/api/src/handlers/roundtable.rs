//! Streaming roundtable endpoint.
//!
//! Ownership and input checks happen before the response starts, so they
//! surface as ordinary JSON errors. Once streaming, every failure becomes a
//! final `error` event and the body ends.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use futures::StreamExt;
use scenra_ai::roundtable::{
    run_roundtable, CastMember, RoundtableBrief, RoundtableError, SettingBrief, StyleBrief,
};
use scenra_ai::LlmChat;
use scenra_core::roundtable::{RoundtableEvent, Stage};
use scenra_core::types::DbId;
use scenra_core::validation::{validate_segment_transition, SEGMENT_STATUS_PROMPT_READY};
use scenra_db::models::character::Character;
use scenra_db::models::segment::{RoundtableResult, Segment};
use scenra_db::models::visual_style::VisualStyle;
use scenra_db::repositories::{
    CharacterRepo, EpisodeRepo, SegmentRepo, SeriesRepo, SettingRepo, VisualStyleRepo,
};
use scenra_db::DbPool;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::segment::find_segment;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Bound on buffered events between the run and a slow client.
const EVENT_BUFFER: usize = 64;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

fn cast_member(character: Character) -> CastMember {
    let fingerprint = character
        .visual_fingerprint
        .as_ref()
        .and_then(|fp| fp.get("summary"))
        .and_then(|s| s.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    CastMember {
        name: character.name,
        role: character.role,
        appearance: fingerprint.or(character.appearance),
    }
}

fn style_brief(style: VisualStyle) -> StyleBrief {
    let color_palette = serde_json::from_value(style.color_palette).unwrap_or_default();
    StyleBrief {
        style_name: style.style_name,
        color_palette,
        lighting: style.lighting,
        camera_style: style.camera_style,
        aspect_ratio: Some(style.aspect_ratio),
        film_stock: style.film_stock,
        reference_notes: style.reference_notes,
    }
}

/// Gather everything the agents need to know about a segment.
async fn build_brief(
    pool: &DbPool,
    series_id: DbId,
    segment: &Segment,
) -> AppResult<RoundtableBrief> {
    let series = SeriesRepo::find_by_id(pool, series_id)
        .await?
        .ok_or(AppError::not_found("Series", series_id))?;
    let episode = EpisodeRepo::find_by_id(pool, segment.episode_id)
        .await?
        .ok_or(AppError::not_found("Episode", segment.episode_id))?;

    let setting = match segment.setting_id {
        Some(id) => SettingRepo::find_in_series(pool, series_id, id).await?,
        None => None,
    };
    let cast = CharacterRepo::list_by_ids(pool, series_id, &segment.character_ids).await?;
    let style = VisualStyleRepo::find_by_series(pool, series_id).await?;

    Ok(RoundtableBrief {
        series_title: series.title,
        episode_title: episode.title,
        segment_title: segment.title.clone(),
        description: segment.description.clone(),
        dialogue: segment.dialogue.clone(),
        duration_secs: segment.duration_secs,
        setting: setting.map(|s| SettingBrief {
            name: s.name,
            setting_type: s.setting_type,
            time_of_day: s.time_of_day,
            description: s.description,
            atmosphere: s.atmosphere,
        }),
        cast: cast.into_iter().map(cast_member).collect(),
        style: style.map(style_brief),
    })
}

/// Run the roundtable, persist the outcome, and finish with exactly one
/// terminal event.
async fn drive(
    llm: Arc<dyn LlmChat>,
    pool: DbPool,
    segment_id: DbId,
    brief: RoundtableBrief,
    tx: mpsc::Sender<RoundtableEvent>,
) {
    let outcome = match run_roundtable(llm.as_ref(), &brief, &tx).await {
        Ok(outcome) => outcome,
        Err(RoundtableError::Cancelled) => {
            tracing::info!(segment_id, "Roundtable client disconnected");
            return;
        }
        Err(RoundtableError::Ai(e)) => {
            tracing::error!(segment_id, error = %e, "Roundtable failed");
            let message = if e.is_upstream() {
                "Roundtable failed: the AI provider request did not succeed".to_string()
            } else {
                format!("Roundtable failed: {e}")
            };
            let _ = tx.send(RoundtableEvent::error(message)).await;
            return;
        }
    };

    let result = RoundtableResult {
        generated_prompt: outcome.prompt.clone(),
        shot_list: outcome.shot_list.clone(),
        shots: serde_json::to_value(&outcome.shots).unwrap_or_default(),
        transcript: serde_json::to_value(&outcome.transcript).unwrap_or_default(),
    };
    match SegmentRepo::save_roundtable_result(&pool, segment_id, &result).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(
                segment_id,
                "Segment removed or moved past prompt_ready during roundtable"
            );
            let _ = tx
                .send(RoundtableEvent::error(
                    "Segment was deleted or its status changed during the roundtable",
                ))
                .await;
            return;
        }
        Err(e) => {
            tracing::error!(segment_id, error = %e, "Failed to save roundtable result");
            let _ = tx
                .send(RoundtableEvent::error("Failed to save the roundtable result"))
                .await;
            return;
        }
    }

    tracing::info!(
        segment_id,
        shots = outcome.shots.len(),
        prompt_chars = outcome.prompt.len(),
        "Roundtable complete"
    );
    let _ = tx
        .send(RoundtableEvent::status(
            "Roundtable complete",
            100,
            Stage::Complete,
        ))
        .await;
    let _ = tx
        .send(RoundtableEvent::Complete {
            segment_id,
            prompt: outcome.prompt,
            shot_list: outcome.shot_list,
        })
        .await;
}

/// POST /api/v1/episodes/{episode_id}/segments/{id}/roundtable
///
/// Responds with `application/x-ndjson`: one roundtable event per line,
/// ending in a single `complete` or `error` event.
pub async fn run(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((episode_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    let (series_id, segment) = find_segment(&state, &auth, episode_id, id).await?;
    validate_segment_transition(&segment.status, SEGMENT_STATUS_PROMPT_READY)?;
    let llm = state.llm()?;
    let brief = build_brief(&state.pool, series_id, &segment).await?;

    tracing::info!(
        segment_id = id,
        cast = brief.cast.len(),
        has_setting = brief.setting.is_some(),
        has_style = brief.style.is_some(),
        "Starting roundtable"
    );

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(drive(llm, state.pool.clone(), id, brief, tx));

    let lines = ReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(event.to_line()));
    Response::builder()
        .header(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(lines))
        .map_err(|e| AppError::InternalError(format!("Failed to build stream response: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn character(appearance: Option<&str>, fingerprint: Option<serde_json::Value>) -> Character {
        Character {
            id: 1,
            series_id: 1,
            name: "Mara".into(),
            role: "protagonist".into(),
            description: None,
            personality: None,
            appearance: appearance.map(str::to_string),
            visual_fingerprint: fingerprint,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fingerprint_summary_wins_over_written_appearance() {
        let member = cast_member(character(
            Some("tall"),
            Some(json!({ "summary": "Red coat, cropped grey hair" })),
        ));
        assert_eq!(member.appearance.as_deref(), Some("Red coat, cropped grey hair"));
    }

    #[test]
    fn blank_fingerprint_falls_back_to_appearance() {
        let member = cast_member(character(Some("tall"), Some(json!({ "summary": "  " }))));
        assert_eq!(member.appearance.as_deref(), Some("tall"));

        let member = cast_member(character(None, None));
        assert_eq!(member.appearance, None);
    }

    #[test]
    fn style_palette_is_read_from_json() {
        let style = VisualStyle {
            id: 1,
            series_id: 1,
            style_name: Some("Noir".into()),
            color_palette: json!(["#101010", "#c0a060"]),
            lighting: None,
            camera_style: None,
            aspect_ratio: "2.39:1".into(),
            film_stock: None,
            reference_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let brief = style_brief(style);
        assert_eq!(brief.color_palette, vec!["#101010", "#c0a060"]);
        assert_eq!(brief.aspect_ratio.as_deref(), Some("2.39:1"));
    }
}
