use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{IssueTracker, LanguageModelService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub tracker: Arc<IssueTracker>,
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        tracker: Arc<IssueTracker>,
        language_model: Arc<dyn LanguageModelService>,
    ) -> Self {
        Self {
            config,
            tracker,
            language_model,
        }
    }

    /// Account the automation acts as; tickets left assigned to it get unassigned.
    pub fn service_account(&self) -> &str {
        &self.config.jira.username
    }
}
