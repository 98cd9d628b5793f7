use std::sync::Arc;

use scenra_ai::LlmChat;
use scenra_core::storage::LocalStorage;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: scenra_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Object store for character images and segment videos.
    pub storage: Arc<LocalStorage>,
    /// Chat model used by the vision, screenplay and roundtable endpoints.
    pub llm: Option<Arc<dyn LlmChat>>,
}

impl AppState {
    /// The configured chat model, or 503 when AI is disabled.
    pub fn llm(&self) -> AppResult<Arc<dyn LlmChat>> {
        self.llm.clone().ok_or_else(|| {
            AppError::ServiceUnavailable("AI features are not configured on this server".into())
        })
    }
}
