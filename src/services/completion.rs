use std::sync::Arc;

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::services::{LanguageModelService, ResponseFormat};

/// A language model bound to one system prompt.
#[derive(Clone)]
pub struct CompletionFacade {
    model: Arc<dyn LanguageModelService>,
    system_prompt: String,
}

impl CompletionFacade {
    pub fn new(model: Arc<dyn LanguageModelService>, system_prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
        }
    }

    pub async fn create_completion(&self, message: &str) -> AppResult<String> {
        self.model
            .complete(&self.system_prompt, message, ResponseFormat::Text)
            .await
    }

    /// Requests JSON output. Text that does not parse is an error, never patched up.
    pub async fn create_json_completion(&self, message: &str) -> AppResult<Value> {
        let text = self
            .model
            .complete(&self.system_prompt, message, ResponseFormat::JsonObject)
            .await?;
        serde_json::from_str(&text).map_err(|err| AppError::Parse(format!("{err}: {text}")))
    }
}
