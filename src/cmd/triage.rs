use clap::Args;

use crate::error::AppResult;
use crate::workflow::automation::{Automation, BatchSummary, DEFAULT_SEARCH_LIMIT, TicketOutcome};

#[derive(Args, Debug, Clone)]
pub struct IssueArgs {
    /// The Jira issue key, e.g. SPO-123456.
    #[arg(long)]
    pub key: String,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Limit the number of issues that will be handled.
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,
}

pub async fn run_issue(automation: &Automation, args: IssueArgs) -> AppResult<TicketOutcome> {
    automation.run_issue(&args.key).await
}

pub async fn run_search(automation: &Automation, args: SearchArgs) -> AppResult<BatchSummary> {
    automation.run_search(args.limit).await
}

pub fn describe(outcome: &TicketOutcome) -> String {
    match outcome {
        TicketOutcome::Generic => "classified as generic, no workflow run".to_string(),
        TicketOutcome::NoWorkflow => "classified, no workflow defined".to_string(),
        TicketOutcome::WorkflowCompleted(path) => format!("workflow {path} completed"),
        TicketOutcome::Failed(reason) => format!("failed and reported on ticket: {reason}"),
    }
}
