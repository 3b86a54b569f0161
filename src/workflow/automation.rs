use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use minijinja::context;
use serde_json::{Map, json};

use crate::context::AppContext;
use crate::domain::classification::Classification;
use crate::domain::ticket::{HANDLED_LABEL, Ticket};
use crate::error::{AppError, AppResult, error_trace};
use crate::templating::render_template;
use crate::workflow::classifier::TicketClassifier;
use crate::workflow::dispatcher::{Dispatch, WorkflowRegistry, workflow_path};

/// Unresolved incidents from the mail plugin that have not been handled yet.
pub const SEARCH_QUERY: &str = r#"project = SPO
AND resolution = Unresolved
AND Type = "SPO Incident"
AND Reporter = "mailplugin"
AND (labels is EMPTY OR labels not in ("spo-automation-handled"))
ORDER BY updated DESC"#;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

const CLASSIFICATION_COMMENT: &str = "*This issue was classified as {{ category }} - {{ subcategory }} with {{ confidence }} confidence*
_Workflow: {{ mapped }}_

{{ rationale }}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketOutcome {
    /// The model picked a generic subcategory; nothing to run.
    Generic,
    NoWorkflow,
    WorkflowCompleted(String),
    /// Processing failed and the error was reported on the ticket.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<(String, TicketOutcome)>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TicketOutcome::Failed(_)))
            .count()
    }
}

pub struct Automation {
    ctx: AppContext,
    classifier: TicketClassifier,
    registry: WorkflowRegistry,
}

impl Automation {
    pub fn new(ctx: AppContext, registry: WorkflowRegistry) -> AppResult<Self> {
        let classifier = TicketClassifier::new(ctx.language_model.clone())?;
        Ok(Self {
            ctx,
            classifier,
            registry,
        })
    }

    pub async fn run_issue(&self, key: &str) -> AppResult<TicketOutcome> {
        let mut ticket = self.ctx.tracker.get_issue(key).await?;
        self.try_process(&mut ticket).await
    }

    /// Tickets are handled one at a time in search order. Errors inside a
    /// ticket are reported on that ticket; tracker failures outside that
    /// boundary abort the batch.
    pub async fn run_search(&self, limit: usize) -> AppResult<BatchSummary> {
        let keys = self.ctx.tracker.search_issues(SEARCH_QUERY, limit).await?;
        tracing::info!(
            count = keys.len(),
            limit,
            dry_run = self.ctx.tracker.is_dry_run(),
            "found tickets to handle"
        );

        let mut summary = BatchSummary::default();
        for key in keys {
            let outcome = self.run_issue(&key).await?;
            summary.outcomes.push((key, outcome));
        }
        Ok(summary)
    }

    /// Processes a ticket, reporting any failure as a comment on it. The
    /// automation account is unassigned afterwards whatever the result.
    pub async fn try_process(&self, ticket: &mut Ticket) -> AppResult<TicketOutcome> {
        let outcome = match self.process(ticket).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                tracing::error!(issue_key = %ticket.key, %error, "ticket processing failed");
                let body = format!(
                    "An error occurred in the SPO-automation for this ticket:\n\n{{noformat}}\n{}\n{{noformat}}",
                    error_trace(&error)
                );
                self.ctx
                    .tracker
                    .add_comment(&ticket.key, &body)
                    .await
                    .map(|_| TicketOutcome::Failed(error.to_string()))
            }
        };

        let released = self.release_assignment(ticket).await;
        let outcome = outcome?;
        released?;
        Ok(outcome)
    }

    pub async fn process(&self, ticket: &mut Ticket) -> AppResult<TicketOutcome> {
        tracing::info!(issue_key = %ticket.key, "handling ticket");

        self.mark_handled(ticket).await?;

        let classification = self.classifier.classify(ticket).await?;
        self.ctx
            .tracker
            .add_comment(&ticket.key, &classification_comment(&classification)?)
            .await?;

        let category = classification.category;
        let mapped_subcategory = classification.mapped_subcategory;
        if mapped_subcategory.is_generic() {
            tracing::info!(
                issue_key = %ticket.key,
                "classification was generic, not running any workflows"
            );
            return Ok(TicketOutcome::Generic);
        }

        let path = workflow_path(category, mapped_subcategory);
        match self
            .registry
            .dispatch(&self.ctx, category, mapped_subcategory)?
        {
            Dispatch::NotFound => {
                tracing::info!(
                    issue_key = %ticket.key,
                    %path,
                    "no workflow is defined for {category} - {}",
                    classification.subcategory
                );
                Ok(TicketOutcome::NoWorkflow)
            }
            Dispatch::Handler(handler) => {
                tracing::info!(issue_key = %ticket.key, %path, "running workflow");
                AssertUnwindSafe(handler.on_create(&self.ctx, ticket))
                    .catch_unwind()
                    .await
                    .map_err(|panic| {
                        AppError::Workflow(format!(
                            "{path} panicked: {}",
                            panic_message(panic.as_ref())
                        ))
                    })??;
                Ok(TicketOutcome::WorkflowCompleted(path))
            }
        }
    }

    /// Adds the sentinel label first so the ticket is never picked up twice.
    async fn mark_handled(&self, ticket: &mut Ticket) -> AppResult<()> {
        if !ticket.add_label(HANDLED_LABEL) {
            return Ok(());
        }
        let mut fields = Map::new();
        fields.insert("Labels".to_string(), json!(ticket.labels));
        self.ctx.tracker.update_fields(&ticket.key, &fields).await
    }

    async fn release_assignment(&self, ticket: &mut Ticket) -> AppResult<()> {
        if !ticket.is_assigned_to(self.ctx.service_account()) {
            return Ok(());
        }
        self.ctx.tracker.assign_issue(&ticket.key, None).await?;
        ticket.assignee = None;
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn classification_comment(classification: &Classification) -> AppResult<String> {
    render_template(
        CLASSIFICATION_COMMENT,
        context! {
            category => classification.category.as_str(),
            subcategory => &classification.subcategory,
            mapped => classification.mapped_subcategory.as_str(),
            confidence => &classification.confidence,
            rationale => &classification.rationale,
        },
    )
}
