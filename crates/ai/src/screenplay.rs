//! Screenplay segmentation.
//!
//! Splits an episode screenplay into short, individually generatable
//! segments. Scene headings found locally are passed to the model as
//! structure hints; the reply is validated and normalised before it is
//! returned.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::json::parse_model_json;
use crate::types::{LlmChat, Message};

/// Shortest segment the video models handle well.
pub const MIN_DRAFT_DURATION_SECS: f64 = 2.0;
/// Longest single generation.
pub const MAX_DRAFT_DURATION_SECS: f64 = 30.0;
/// Used when the model omits a duration.
pub const DEFAULT_DRAFT_DURATION_SECS: f64 = 5.0;

const MAX_TOKENS: u32 = 8192;

const SYSTEM_PROMPT: &str = "You are a first assistant director breaking a screenplay into \
short video segments for AI generation. Each segment covers one continuous shot or beat of at \
most 30 seconds. Keep the screenplay order. Reply with a JSON array and nothing else.";

static SLUGLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:\d+\s+)?((?:INT\./EXT\.|EXT\./INT\.|INT/EXT|I/E|INT\.|EXT\.)\s*.+?)\s*$")
        .expect("slugline regex is valid")
});

/// Input for [`segment_screenplay`].
#[derive(Debug, Clone, Default)]
pub struct ScreenplayRequest {
    pub episode_title: String,
    pub screenplay: String,
    /// Known character names in the series.
    pub characters: Vec<String>,
    /// Known setting names in the series.
    pub settings: Vec<String>,
}

/// A proposed segment before it is matched to database ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dialogue: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub setting: Option<String>,
}

/// Scene headings (`INT.`/`EXT.` sluglines) in document order.
pub fn scene_headings(screenplay: &str) -> Vec<String> {
    SLUGLINE
        .captures_iter(screenplay)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ask the model to split `request.screenplay` into segment drafts.
///
/// Durations are clamped to
/// [`MIN_DRAFT_DURATION_SECS`]..=[`MAX_DRAFT_DURATION_SECS`], blank optional
/// fields become `None`, and drafts without a title get `Segment N`.
///
/// # Errors
///
/// [`AiError::InvalidInput`] for an empty screenplay; [`AiError::InvalidOutput`]
/// when the reply is not a non-empty JSON array of drafts.
pub async fn segment_screenplay(
    llm: &dyn LlmChat,
    request: &ScreenplayRequest,
) -> Result<Vec<SegmentDraft>, AiError> {
    if request.screenplay.trim().is_empty() {
        return Err(AiError::InvalidInput("Screenplay is empty".into()));
    }

    let headings = scene_headings(&request.screenplay);
    tracing::info!(
        episode = %request.episode_title,
        chars = request.screenplay.len(),
        scenes = headings.len(),
        "Segmenting screenplay"
    );

    let prompt = segmentation_prompt(request, &headings);
    let response = llm
        .chat(MAX_TOKENS, SYSTEM_PROMPT, &[Message::user(prompt)])
        .await?;

    let drafts: Vec<SegmentDraft> = parse_model_json(&response.text())?;
    if drafts.is_empty() {
        return Err(AiError::InvalidOutput("model returned no segments".into()));
    }
    Ok(drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| normalize(i, d))
        .collect())
}

fn normalize(index: usize, mut draft: SegmentDraft) -> SegmentDraft {
    draft.title = draft.title.trim().to_string();
    if draft.title.is_empty() {
        draft.title = format!("Segment {}", index + 1);
    }
    draft.description = draft.description.trim().to_string();
    draft.dialogue = draft
        .dialogue
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    draft.setting = draft
        .setting
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let duration = draft
        .duration_secs
        .filter(|d| d.is_finite())
        .unwrap_or(DEFAULT_DRAFT_DURATION_SECS);
    draft.duration_secs = Some(duration.clamp(MIN_DRAFT_DURATION_SECS, MAX_DRAFT_DURATION_SECS));
    draft
}

fn segmentation_prompt(request: &ScreenplayRequest, headings: &[String]) -> String {
    let mut prompt = format!("Episode: {}\n", request.episode_title);
    if !request.characters.is_empty() {
        prompt.push_str(&format!("Known characters: {}\n", request.characters.join(", ")));
    }
    if !request.settings.is_empty() {
        prompt.push_str(&format!("Known settings: {}\n", request.settings.join(", ")));
    }
    if !headings.is_empty() {
        prompt.push_str("Scene headings in order:\n");
        for (i, heading) in headings.iter().enumerate() {
            prompt.push_str(&format!("{}. {heading}\n", i + 1));
        }
    }
    prompt.push_str(
        "\nReturn a JSON array. Each element has: title (short), description (what is seen), \
         dialogue (spoken lines or null), duration_secs (number, 2-30), characters (array of \
         names from the known characters), setting (one of the known settings or null).\n\n\
         SCREENPLAY:\n",
    );
    prompt.push_str(&request.screenplay);
    prompt
}
