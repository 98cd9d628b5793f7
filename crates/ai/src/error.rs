//! Errors produced by AI operations.

/// Errors from the LLM client and the workflows built on it.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Caller-supplied input was unusable (empty screenplay, no images).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model answered, but not in the shape we asked for.
    #[error("unexpected model output: {0}")]
    InvalidOutput(String),
}

impl AiError {
    /// Whether the failure came from the upstream provider rather than the
    /// caller.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_caller_input_is_not_upstream() {
        assert!(!AiError::InvalidInput("no images".into()).is_upstream());
        assert!(AiError::ApiResponse { status: 500, body: String::new() }.is_upstream());
        assert!(AiError::InvalidOutput("prose".into()).is_upstream());
    }
}
