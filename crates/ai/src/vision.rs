//! Character vision analysis.
//!
//! Sends a character's reference images to the model and asks for a
//! structured [`VisualFingerprint`] that later prompts reuse to keep the
//! character consistent across shots.

use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::json::parse_model_json;
use crate::types::{ContentBlock, LlmChat, Message};

/// Images sent per analysis request.
pub const MAX_ANALYSIS_IMAGES: usize = 4;

const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You are a character designer preparing a continuity bible for an \
AI video production. Describe only what is visible in the reference images. Reply with a single \
JSON object and nothing else.";

/// Text context about the character being analyzed.
#[derive(Debug, Clone, Default)]
pub struct CharacterBrief {
    pub name: String,
    pub role: String,
    pub description: Option<String>,
    pub appearance: Option<String>,
}

/// One reference image.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Structured appearance of a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualFingerprint {
    pub face: String,
    pub hair: String,
    pub eyes: String,
    pub build: String,
    pub skin_tone: String,
    pub age_range: String,
    pub wardrobe: String,
    pub distinguishing_features: Vec<String>,
    /// One-sentence description suitable for dropping into a prompt.
    pub summary: String,
}

/// Analyze up to [`MAX_ANALYSIS_IMAGES`] reference images of a character.
///
/// # Errors
///
/// [`AiError::InvalidInput`] without images; [`AiError::InvalidOutput`]
/// when the reply has no usable summary; provider errors as-is.
pub async fn analyze_character(
    llm: &dyn LlmChat,
    brief: &CharacterBrief,
    images: &[ImageInput],
) -> Result<VisualFingerprint, AiError> {
    if images.is_empty() {
        return Err(AiError::InvalidInput(
            "At least one reference image is required for analysis".into(),
        ));
    }

    let mut blocks: Vec<ContentBlock> = images
        .iter()
        .take(MAX_ANALYSIS_IMAGES)
        .map(|img| ContentBlock::image(&img.media_type, &img.bytes))
        .collect();
    blocks.push(ContentBlock::text(analysis_prompt(brief)));

    tracing::info!(
        character = %brief.name,
        images = blocks.len() - 1,
        "Requesting visual fingerprint"
    );
    let response = llm
        .chat(MAX_TOKENS, SYSTEM_PROMPT, &[Message::user_blocks(blocks)])
        .await?;

    let fingerprint: VisualFingerprint = parse_model_json(&response.text())?;
    if fingerprint.summary.trim().is_empty() {
        return Err(AiError::InvalidOutput(
            "visual fingerprint is missing a summary".into(),
        ));
    }
    Ok(fingerprint)
}

fn analysis_prompt(brief: &CharacterBrief) -> String {
    let mut prompt = format!("Character: {} ({})\n", brief.name, brief.role);
    if let Some(description) = brief.description.as_deref().filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("Story notes: {description}\n"));
    }
    if let Some(appearance) = brief.appearance.as_deref().filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("Written appearance notes: {appearance}\n"));
    }
    prompt.push_str(
        "\nReturn JSON with these string fields: face, hair, eyes, build, skin_tone, \
         age_range, wardrobe, summary; and distinguishing_features as an array of strings. \
         Prefer concrete, filmable detail over adjectives.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::mock::ScriptedLlm;
    use crate::types::Content;

    fn brief() -> CharacterBrief {
        CharacterBrief {
            name: "Mara".into(),
            role: "protagonist".into(),
            description: Some("Night-shift paramedic".into()),
            appearance: None,
        }
    }

    fn png() -> ImageInput {
        ImageInput {
            media_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn parses_fingerprint_from_fenced_reply() {
        let llm = ScriptedLlm::new([r#"Here it is:
```json
{"face": "angular", "hair": "short black", "eyes": "grey", "build": "wiry",
 "skin_tone": "olive", "age_range": "30-35", "wardrobe": "navy uniform",
 "distinguishing_features": ["scar over left brow"],
 "summary": "Wiry woman in her early thirties with a scar over her left brow."}
```"#]);

        let fp = analyze_character(&llm, &brief(), &[png()]).await.unwrap();
        assert_eq!(fp.hair, "short black");
        assert_eq!(fp.distinguishing_features, ["scar over left brow"]);

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        let Content::Blocks(blocks) = &calls[0].messages[0].content else {
            panic!("expected block content");
        };
        assert_matches!(blocks[0], ContentBlock::Image { .. });
        assert_matches!(&blocks[1], ContentBlock::Text { text } if text.contains("Night-shift paramedic"));
    }

    #[tokio::test]
    async fn caps_number_of_images() {
        let llm = ScriptedLlm::always(r#"{"summary": "x"}"#);
        let images = vec![png(); MAX_ANALYSIS_IMAGES + 3];
        analyze_character(&llm, &brief(), &images).await.unwrap();
        let Content::Blocks(blocks) = &llm.calls()[0].messages[0].content else {
            panic!("expected block content");
        };
        assert_eq!(blocks.len(), MAX_ANALYSIS_IMAGES + 1);
    }

    #[tokio::test]
    async fn requires_images() {
        let llm = ScriptedLlm::always("{}");
        assert_matches!(
            analyze_character(&llm, &brief(), &[]).await,
            Err(AiError::InvalidInput(_))
        );
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_summary_is_invalid_output() {
        let llm = ScriptedLlm::always(r#"{"face": "round"}"#);
        assert_matches!(
            analyze_character(&llm, &brief(), &[png()]).await,
            Err(AiError::InvalidOutput(_))
        );
    }
}
