use async_trait::async_trait;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        message: &str,
        format: ResponseFormat,
    ) -> AppResult<String>;
}
