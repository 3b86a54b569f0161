use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the loaded configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand, config: &AppConfig) -> AppResult<()> {
    match command {
        ConfigCommand::Show => {
            for line in render(config) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn render(config: &AppConfig) -> Vec<String> {
    let completion = &config.openai.completion;
    vec![
        format!("Configuration file: {}", config.source.display()),
        format!("Jira host: {}", display_value(&config.jira.host)),
        format!("Jira username: {}", display_value(&config.jira.username)),
        format!("Jira password: {}", mask_secret(&config.jira.password)),
        format!("Dry-run: {}", config.jira.dryrun),
        format!("OpenAI endpoint: {}", display_value(&config.openai.endpoint)),
        format!("OpenAI deployment: {}", display_value(&config.openai.deployment)),
        format!("OpenAI API version: {}", display_value(&config.openai.api_version)),
        format!("OpenAI key: {}", mask_secret(&config.openai.key)),
        format!(
            "Completion parameters: temperature={} max_tokens={} top_p={} frequency_penalty={} presence_penalty={}",
            completion.temperature,
            completion.max_tokens,
            completion.top_p,
            completion.frequency_penalty,
            completion.presence_penalty
        ),
        format!("Log level: {}", display_value(&config.logging.level)),
    ]
}

fn display_value(value: &str) -> String {
    if value.trim().is_empty() {
        "<not set>".to_string()
    } else {
        value.to_string()
    }
}

fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => "<not set>".to_string(),
        len if len > 6 => {
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[len - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        _ => "***".to_string(),
    }
}
