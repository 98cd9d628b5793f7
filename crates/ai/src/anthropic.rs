//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Parsing lives in
//! [`parse_response`] so it can be tested without a network.

use std::time::Duration;

use crate::config::AiConfig;
use crate::error::AiError;
use crate::types::{ChatResponse, ContentBlock, LlmChat, Message};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: format!("{}/v1/messages", config.base_url),
            max_tokens: config.max_tokens,
        })
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for AnthropicClient {
    async fn chat(
        &self,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<ChatResponse, AiError> {
        let body = ApiRequest {
            model: &self.model,
            max_tokens: max_tokens.min(self.max_tokens),
            system,
            messages,
        };

        let started = std::time::Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::ApiRequest(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AiError::ApiRequest(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Anthropic API returned an error");
            return Err(AiError::ApiResponse {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed = parse_response(&text)?;
        tracing::debug!(
            model = %parsed.model,
            input_tokens = parsed.input_tokens,
            output_tokens = parsed.output_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "LLM call complete"
        );
        Ok(parsed)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "is_blank")]
    system: &'a str,
    messages: &'a [Message],
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(serde::Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str) -> Result<ChatResponse, AiError> {
    let api: ApiResponse =
        serde_json::from_str(json).map_err(|e| AiError::ApiParse(e.to_string()))?;

    let content: Vec<ContentBlock> = api
        .content
        .into_iter()
        .filter(|block| !matches!(block, ContentBlock::Unknown))
        .collect();

    Ok(ChatResponse {
        content,
        model: api.model,
        stop_reason: api.stop_reason.unwrap_or_default(),
        input_tokens: api.usage.input_tokens,
        output_tokens: api.usage.output_tokens,
    })
}
