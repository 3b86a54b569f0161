use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jira: JiraSettings,
    pub openai: OpenAiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(skip)]
    pub source: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_dryrun")]
    pub dryrun: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    pub key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_deployment")]
    pub deployment: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub completion: CompletionParameters,
}

/// Sampling parameters sent with every chat completion request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompletionParameters {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for CompletionParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 800,
            top_p: 0.95,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_dryrun() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://instance-openai-france.openai.azure.com".to_string()
}

fn default_deployment() -> String {
    "gpt-4".to_string()
}

fn default_api_version() -> String {
    "2023-12-01-preview".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AppError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        let mut config = Self::parse(&contents)?;
        config.source = path.to_path_buf();
        Ok(config)
    }

    pub fn parse(contents: &str) -> AppResult<Self> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|err| AppError::Configuration(format!("invalid config file: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        let required = [
            ("jira.host", &self.jira.host),
            ("jira.username", &self.jira.username),
            ("jira.password", &self.jira.password),
            ("openai.key", &self.openai.key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}
