use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::domain::comment::Comment;
use crate::domain::fields::{FieldCatalog, ResolvedFields};
use crate::domain::ticket::{Ticket, Transition};
use crate::error::{AppError, AppResult};
use crate::services::{IssueReader, IssueWriter};

/// Facade over the issue tracker.
///
/// Reads always go to `reader`. Writes go to `writer`, which is either the real
/// client or a dry-run writer; the choice is made once by whoever builds the
/// facade. Field names are translated to ids through a catalog that is loaded
/// on first use and kept for the life of the process.
pub struct IssueTracker {
    reader: Arc<dyn IssueReader>,
    writer: Arc<dyn IssueWriter>,
    dry_run: bool,
    catalog: OnceCell<Arc<FieldCatalog>>,
}

impl IssueTracker {
    pub fn new(reader: Arc<dyn IssueReader>, writer: Arc<dyn IssueWriter>, dry_run: bool) -> Self {
        Self {
            reader,
            writer,
            dry_run,
            catalog: OnceCell::new(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn field_catalog(&self) -> AppResult<Arc<FieldCatalog>> {
        let catalog = self
            .catalog
            .get_or_try_init(|| async {
                let catalog = self.reader.field_catalog().await?;
                tracing::debug!(fields = catalog.field_count(), "loaded field catalog");
                Ok::<_, AppError>(Arc::new(catalog))
            })
            .await?;
        Ok(Arc::clone(catalog))
    }

    pub async fn get_issue(&self, key: &str) -> AppResult<Ticket> {
        let catalog = self.field_catalog().await?;
        let record = self.reader.get_issue(key).await?;
        Ok(Ticket::new(record.key, record.id, record.fields, catalog))
    }

    /// In dry-run a missing comment yields a placeholder, because dry-run flows
    /// routinely refer to comments that were never created.
    pub async fn get_comment(&self, issue_key: &str, comment_id: &str) -> AppResult<Comment> {
        match self.reader.get_comment(issue_key, comment_id).await {
            Err(AppError::NotFound(what)) if self.dry_run => {
                tracing::debug!(issue_key, comment_id, "{what} missing, using placeholder");
                Ok(Comment::placeholder(""))
            }
            other => other,
        }
    }

    pub async fn search_issues(&self, jql: &str, max_results: usize) -> AppResult<Vec<String>> {
        self.reader.search(jql, max_results).await
    }

    pub async fn transitions(&self, issue_key: &str) -> AppResult<Vec<Transition>> {
        self.reader.transitions(issue_key).await
    }

    pub async fn add_comment(&self, issue_key: &str, body: &str) -> AppResult<Comment> {
        self.writer.add_comment(issue_key, body).await
    }

    pub async fn update_comment(
        &self,
        issue_key: &str,
        comment_id: &str,
        body: &str,
    ) -> AppResult<Comment> {
        self.writer.update_comment(issue_key, comment_id, body).await
    }

    pub async fn assign_issue(&self, issue_key: &str, assignee: Option<&str>) -> AppResult<()> {
        self.writer.assign(issue_key, assignee).await
    }

    /// `transition` may be a transition id or its name.
    pub async fn transition_issue(
        &self,
        issue_key: &str,
        transition: &str,
        fields: Option<&Map<String, Value>>,
        comment: Option<&str>,
    ) -> AppResult<()> {
        let target = self.resolve_transition(issue_key, transition).await?;
        let resolved = match fields {
            Some(fields) => self.field_catalog().await?.resolve(fields),
            None => ResolvedFields::default(),
        };
        self.writer
            .transition(issue_key, &target, &resolved, comment)
            .await
    }

    /// Updates fields given by human-readable name.
    pub async fn update_fields(&self, issue_key: &str, fields: &Map<String, Value>) -> AppResult<()> {
        let resolved = self.field_catalog().await?.resolve(fields);
        self.writer.update_fields(issue_key, &resolved).await
    }

    async fn resolve_transition(&self, issue_key: &str, transition: &str) -> AppResult<Transition> {
        let available = self.reader.transitions(issue_key).await?;
        if let Some(found) = available
            .iter()
            .find(|candidate| candidate.id == transition)
            .or_else(|| {
                available
                    .iter()
                    .find(|candidate| candidate.name.eq_ignore_ascii_case(transition))
            })
        {
            return Ok(found.clone());
        }

        if !transition.is_empty() && transition.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Transition {
                id: transition.to_string(),
                name: transition.to_string(),
            });
        }

        Err(AppError::IssueTracker(format!(
            "no transition named '{transition}' available for {issue_key}"
        )))
    }
}
