use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::comment::Comment;
use crate::domain::fields::ResolvedFields;
use crate::domain::ticket::Transition;
use crate::error::AppResult;
use crate::logging::IntentLog;
use crate::services::IssueWriter;

/// Write contract that never touches the tracker: every call is logged as an
/// intent and answered with a placeholder.
pub struct DryRunWriter {
    log: Arc<dyn IntentLog>,
}

impl DryRunWriter {
    pub fn new(log: Arc<dyn IntentLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl IssueWriter for DryRunWriter {
    async fn add_comment(&self, issue_key: &str, body: &str) -> AppResult<Comment> {
        self.log.body(issue_key, "Adding comment", body);
        Ok(Comment::placeholder(body))
    }

    async fn update_comment(
        &self,
        issue_key: &str,
        comment_id: &str,
        body: &str,
    ) -> AppResult<Comment> {
        self.log
            .body(issue_key, &format!("Updating body of comment {comment_id}:"), body);
        let mut comment = Comment::placeholder(body);
        comment.id = comment_id.to_string();
        Ok(comment)
    }

    async fn assign(&self, issue_key: &str, assignee: Option<&str>) -> AppResult<()> {
        match assignee {
            Some(name) => self.log.info(issue_key, &format!("Assigning to {name}")),
            None => self.log.info(issue_key, "Unassigning"),
        }
        Ok(())
    }

    async fn transition(
        &self,
        issue_key: &str,
        transition: &Transition,
        fields: &ResolvedFields,
        comment: Option<&str>,
    ) -> AppResult<()> {
        self.log.info(
            issue_key,
            &format!(
                "Transitioning to {} ({}) with fields {} and comment {}",
                transition.name,
                transition.id,
                Value::Object(fields.by_name()),
                comment.unwrap_or("<none>"),
            ),
        );
        Ok(())
    }

    async fn update_fields(&self, issue_key: &str, fields: &ResolvedFields) -> AppResult<()> {
        self.log.info(
            issue_key,
            &format!("Updating fields {}", Value::Object(fields.by_name())),
        );
        Ok(())
    }
}
