mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod services;
mod templating;
#[cfg(test)]
mod testing;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::triage::{self, IssueArgs, SearchArgs};
use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::dryrun::DryRunWriter;
use crate::infra::jira::JiraClient;
use crate::infra::llm::AzureOpenAiClient;
use crate::logging::TracingIntentLog;
use crate::services::{IssueTracker, IssueWriter, LanguageModelService};
use crate::workflow::automation::Automation;
use crate::workflow::dispatcher::WorkflowRegistry;
use crate::workflow::handlers::register_builtin;

#[derive(Parser)]
#[command(
    name = "spo-automation",
    author,
    version,
    about = "Apply automation to SPO Jira tickets"
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Force dry-run mode regardless of the configuration file.
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run automation for a specific issue.
    Issue(IssueArgs),
    /// Search for applicable issues and run automation on all of them.
    SearchIssues(SearchArgs),
    /// Inspect the configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    if cli.dry_run {
        config.jira.dryrun = true;
    }
    logging::init(&config.logging)?;

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command, &config),
        Commands::Issue(args) => {
            let automation = build_automation(config)?;
            let key = args.key.clone();
            let outcome = triage::run_issue(&automation, args).await?;
            println!("{key}: {}", triage::describe(&outcome));
            Ok(())
        }
        Commands::SearchIssues(args) => {
            let automation = build_automation(config)?;
            let summary = triage::run_search(&automation, args).await?;
            for (key, outcome) in &summary.outcomes {
                println!("{key}: {}", triage::describe(outcome));
            }
            println!(
                "Handled {} ticket(s), {} failed.",
                summary.outcomes.len(),
                summary.failed()
            );
            Ok(())
        }
    }
}

fn build_automation(config: AppConfig) -> AppResult<Automation> {
    if config.jira.dryrun {
        tracing::warn!("dry-run mode: no changes will be written to Jira");
    }

    let jira = Arc::new(JiraClient::new(
        &config.jira.host,
        &config.jira.username,
        &config.jira.password,
    ));
    let writer: Arc<dyn IssueWriter> = if config.jira.dryrun {
        Arc::new(DryRunWriter::new(Arc::new(TracingIntentLog)))
    } else {
        jira.clone()
    };
    let tracker = Arc::new(IssueTracker::new(jira, writer, config.jira.dryrun));
    let language_model: Arc<dyn LanguageModelService> =
        Arc::new(AzureOpenAiClient::new(&config.openai));

    let context = AppContext::new(config, tracker, language_model);

    let mut registry = WorkflowRegistry::new();
    register_builtin(&mut registry)?;
    Automation::new(context, registry)
}
