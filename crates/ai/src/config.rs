//! AI configuration parsed from environment variables.

use crate::error::AiError;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL without the `/v1/messages` suffix.
    pub base_url: String,
    /// Upper bound applied to every request's `max_tokens`.
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl AiConfig {
    /// Build the AI config from environment variables.
    ///
    /// Returns `Ok(None)` when `AI_API_KEY` is unset or empty: AI features
    /// are then disabled and the corresponding endpoints answer 503.
    ///
    /// Optional:
    /// - `AI_MODEL`: default `claude-sonnet-4-5-20250929`
    /// - `AI_BASE_URL`: default `https://api.anthropic.com`
    /// - `AI_MAX_TOKENS`: default 4096
    /// - `AI_TIMEOUT_SECS`: request timeout, default 120
    pub fn from_env() -> Result<Option<Self>, AiError> {
        let api_key = match std::env::var("AI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };

        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = std::env::var("AI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let max_tokens = env_parse("AI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(AiError::ConfigParse("AI_MAX_TOKENS must be positive".into()));
        }
        let request_timeout_secs = env_parse("AI_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Some(Self {
            api_key,
            model,
            base_url,
            max_tokens,
            request_timeout_secs,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }))
    }

    /// Config with defaults for everything but the key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AiError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AiError::ConfigParse(format!("{key} is not a valid number: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_api_key_uses_defaults() {
        let config = AiConfig::with_api_key("sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn env_parse_falls_back_to_default_when_unset() {
        let value: u64 = env_parse("SCENRA_TEST_SURELY_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
