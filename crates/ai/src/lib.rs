//! AI collaborators for Scenra Studio.
//!
//! A provider-neutral [`LlmChat`] trait with an Anthropic Messages API
//! implementation, plus the three workflows built on top of it: character
//! vision analysis, screenplay segmentation and the multi-agent roundtable.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod json;
pub mod roundtable;
pub mod screenplay;
pub mod types;
pub mod vision;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use anthropic::AnthropicClient;
pub use config::AiConfig;
pub use error::AiError;
pub use types::LlmChat;
