//! Provider-neutral message types and the chat trait.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

// =============================================================================
// CONTENT BLOCKS
// =============================================================================

/// Inline image payload for vision requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Always `"base64"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

/// A structured content block in a message or API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
    /// Any unrecognized block type. Ignored by downstream logic.
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Base64-encode raw image bytes into an image block.
    pub fn image(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Image {
            source: ImageSource {
                kind: "base64".to_string(),
                media_type: media_type.into(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        }
    }
}

/// Message content: either plain text or structured blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Content,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Content::Text(text.into()),
        }
    }

    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content: Content::Blocks(blocks),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Content::Text(text.into()),
        }
    }
}

/// Response from an LLM chat call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ChatResponse {
    /// Concatenated text of all text blocks, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let ContentBlock::Text { text } = block {
                out.push_str(text);
            }
        }
        out.trim().to_string()
    }
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// Provider-neutral async trait for LLM chat. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send a chat request to the provider.
    ///
    /// # Errors
    ///
    /// Returns an [`AiError`] if the request fails or the response is malformed.
    async fn chat(
        &self,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<ChatResponse, AiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_block_serializes_to_base64_source() {
        let block = ContentBlock::image("image/png", b"abc");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "image",
                "source": { "type": "base64", "media_type": "image/png", "data": "YWJj" }
            })
        );
    }

    #[test]
    fn text_message_serializes_as_plain_string() {
        let value = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(value, serde_json::json!({ "role": "user", "content": "hi" }));
    }

    #[test]
    fn response_text_joins_text_blocks() {
        let resp = ChatResponse {
            content: vec![
                ContentBlock::text("  Hello "),
                ContentBlock::Unknown,
                ContentBlock::text("world  "),
            ],
            model: "m".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 0,
            output_tokens: 0,
        };
        assert_eq!(resp.text(), "Hello world");
    }
}
