//! Screenplay to segment conversion.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scenra_ai::screenplay::{segment_screenplay, ScreenplayRequest, SegmentDraft};
use scenra_core::error::CoreError;
use scenra_core::types::DbId;
use scenra_core::validation::MAX_TITLE_LEN;
use scenra_db::models::segment::{CreateSegment, Segment};
use scenra_db::repositories::{CharacterRepo, SegmentRepo, SettingRepo, VideoRepo};
use serde::Deserialize;

use super::remove_objects;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::authorize_episode;
use crate::response::{data, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateSegmentsRequest {
    /// Screenplay text to convert. Falls back to the episode's stored one.
    pub screenplay: Option<String>,
    /// Replace existing segments instead of answering 409.
    #[serde(default)]
    pub replace: bool,
}

/// Lowercased name to id, for matching model output against the series.
fn name_index<'a>(entries: impl Iterator<Item = (&'a str, DbId)>) -> HashMap<String, DbId> {
    entries
        .map(|(name, id)| (name.trim().to_lowercase(), id))
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Turn a model draft into a segment insert. Names the model invented are
/// dropped rather than rejected.
fn draft_to_segment(
    index: usize,
    draft: SegmentDraft,
    characters: &HashMap<String, DbId>,
    settings: &HashMap<String, DbId>,
) -> CreateSegment {
    let mut character_ids: Vec<DbId> = Vec::new();
    for name in &draft.characters {
        if let Some(&id) = characters.get(&name.trim().to_lowercase()) {
            if !character_ids.contains(&id) {
                character_ids.push(id);
            }
        }
    }

    CreateSegment {
        segment_index: Some(index as i32),
        title: truncate_chars(&draft.title, MAX_TITLE_LEN),
        description: Some(draft.description).filter(|d| !d.is_empty()),
        dialogue: draft.dialogue,
        duration_secs: draft.duration_secs,
        setting_id: draft
            .setting
            .as_deref()
            .and_then(|name| settings.get(&name.trim().to_lowercase()).copied()),
        character_ids: Some(character_ids),
        status: None,
    }
}

/// POST /api/v1/episodes/{episode_id}/segments/generate
///
/// Asks the model to split the screenplay into segments and stores them in
/// order. Existing segments answer 409 unless `replace` is set.
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(episode_id): Path<DbId>,
    Json(input): Json<GenerateSegmentsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Segment>>>)> {
    let episode = authorize_episode(&state.pool, episode_id, &auth).await?;

    let screenplay = input
        .screenplay
        .or(episode.screenplay)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "The episode has no screenplay to convert".into(),
            ))
        })?;
    let llm = state.llm()?;

    if !input.replace
        && !SegmentRepo::list_by_episode(&state.pool, episode_id)
            .await?
            .is_empty()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Episode already has segments; pass replace=true to overwrite them".into(),
        )));
    }

    let characters = CharacterRepo::list_by_series(&state.pool, episode.series_id).await?;
    let settings = SettingRepo::list_by_series(&state.pool, episode.series_id).await?;

    let request = ScreenplayRequest {
        episode_title: episode.title.clone(),
        screenplay,
        characters: characters.iter().map(|c| c.name.clone()).collect(),
        settings: settings.iter().map(|s| s.name.clone()).collect(),
    };
    let drafts = segment_screenplay(llm.as_ref(), &request).await?;

    let character_index = name_index(characters.iter().map(|c| (c.name.as_str(), c.id)));
    let setting_index = name_index(settings.iter().map(|s| (s.name.as_str(), s.id)));
    let inserts: Vec<CreateSegment> = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| draft_to_segment(i, draft, &character_index, &setting_index))
        .collect();

    let old_keys = if input.replace {
        VideoRepo::keys_for_episode(&state.pool, episode_id).await?
    } else {
        Vec::new()
    };

    // The repository re-checks under a row lock, so a concurrent conversion
    // that got there first still ends in 409.
    let segments =
        SegmentRepo::replace_for_episode(&state.pool, episode_id, &inserts, input.replace)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "Episode already has segments; pass replace=true to overwrite them".into(),
                ))
            })?;
    remove_objects(&state, &old_keys).await;

    tracing::info!(
        episode_id,
        segments = segments.len(),
        replaced = input.replace,
        "Screenplay converted to segments"
    );
    Ok((StatusCode::CREATED, data(segments)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, characters: &[&str], setting: Option<&str>) -> SegmentDraft {
        SegmentDraft {
            title: title.to_string(),
            description: String::new(),
            dialogue: None,
            duration_secs: Some(4.0),
            characters: characters.iter().map(|c| c.to_string()).collect(),
            setting: setting.map(str::to_string),
        }
    }

    #[test]
    fn names_match_case_insensitively() {
        let characters = name_index([("Mara", 1), ("Dev", 2)].into_iter());
        let settings = name_index([("Ambulance", 7)].into_iter());

        let segment = draft_to_segment(
            0,
            draft("Pulse", &["mara", "DEV ", "Stranger"], Some("ambulance")),
            &characters,
            &settings,
        );

        assert_eq!(segment.character_ids, Some(vec![1, 2]));
        assert_eq!(segment.setting_id, Some(7));
        assert_eq!(segment.segment_index, Some(0));
        assert_eq!(segment.description, None);
    }

    #[test]
    fn padded_setting_name_still_matches() {
        let settings = name_index([("Ambulance", 7)].into_iter());
        let segment = draft_to_segment(
            0,
            draft("Pulse", &[], Some(" Ambulance\t")),
            &HashMap::new(),
            &settings,
        );
        assert_eq!(segment.setting_id, Some(7));
    }

    #[test]
    fn unknown_setting_is_dropped() {
        let segment = draft_to_segment(
            3,
            draft("Street", &[], Some("Moon Base")),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert_eq!(segment.setting_id, None);
        assert_eq!(segment.character_ids, Some(vec![]));
        assert_eq!(segment.segment_index, Some(3));
    }

    #[test]
    fn long_titles_are_truncated() {
        let long = "x".repeat(MAX_TITLE_LEN + 50);
        let segment =
            draft_to_segment(0, draft(&long, &[], None), &HashMap::new(), &HashMap::new());
        assert_eq!(segment.title.chars().count(), MAX_TITLE_LEN);
    }
}
