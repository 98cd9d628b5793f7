//! Scripted [`LlmChat`] for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::AiError;
use crate::types::{ChatResponse, ContentBlock, LlmChat, Message};

/// One recorded call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub messages: Vec<Message>,
}

/// Replies with queued texts in order, then with `fallback`.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fallback: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: "ok".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply to every call with the same text.
    pub fn always(text: impl Into<String>) -> Self {
        let mut llm = Self::new(Vec::<String>::new());
        llm.fallback = text.into();
        llm
    }

    /// Queue a provider failure (surfaced as a 500 `ApiResponse`).
    pub fn push_error(&self, body: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(body.into()));
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmChat for ScriptedLlm {
    async fn chat(
        &self,
        _max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<ChatResponse, AiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system: system.to_string(),
                messages: messages.to_vec(),
            });
        }
        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Ok(self.fallback.clone()));
        match next {
            Ok(text) => Ok(ChatResponse {
                content: vec![ContentBlock::text(text)],
                model: "mock".into(),
                stop_reason: "end_turn".into(),
                input_tokens: 0,
                output_tokens: 0,
            }),
            Err(body) => Err(AiError::ApiResponse { status: 500, body }),
        }
    }
}
