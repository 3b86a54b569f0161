use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::comment::Comment;
use crate::domain::fields::{FieldCatalog, ResolvedFields};
use crate::domain::ticket::Transition;
use crate::error::AppResult;

/// An issue as returned by the tracker, fields keyed by field id.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    pub key: String,
    pub id: String,
    pub fields: Map<String, Value>,
}

/// Read side of the tracker. Always backed by the real tracker.
#[async_trait]
pub trait IssueReader: Send + Sync {
    async fn get_issue(&self, key: &str) -> AppResult<IssueRecord>;
    async fn get_comment(&self, issue_key: &str, comment_id: &str) -> AppResult<Comment>;
    async fn search(&self, jql: &str, max_results: usize) -> AppResult<Vec<String>>;
    async fn transitions(&self, issue_key: &str) -> AppResult<Vec<Transition>>;
    async fn field_catalog(&self) -> AppResult<FieldCatalog>;
}

/// Write side of the tracker. Dry-run swaps in an implementation that only logs.
#[async_trait]
pub trait IssueWriter: Send + Sync {
    async fn add_comment(&self, issue_key: &str, body: &str) -> AppResult<Comment>;
    async fn update_comment(
        &self,
        issue_key: &str,
        comment_id: &str,
        body: &str,
    ) -> AppResult<Comment>;
    async fn assign(&self, issue_key: &str, assignee: Option<&str>) -> AppResult<()>;
    async fn transition(
        &self,
        issue_key: &str,
        transition: &Transition,
        fields: &ResolvedFields,
        comment: Option<&str>,
    ) -> AppResult<()>;
    async fn update_fields(&self, issue_key: &str, fields: &ResolvedFields) -> AppResult<()>;
}
