use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::comment::Comment;
use crate::domain::fields::{FieldCatalog, ResolvedFields};
use crate::domain::ticket::Transition;
use crate::error::{AppError, AppResult};
use crate::services::{IssueReader, IssueRecord, IssueWriter};

/// Jira REST v2 client with basic auth.
pub struct JiraClient {
    http: Client,
    base_url: String,
    auth_header: String,
}

impl JiraClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: Self::auth_header(username, password),
        }
    }

    fn auth_header(username: &str, password: &str) -> String {
        let credentials = format!("{username}:{password}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.base_url)
    }

    fn issue_endpoint(&self, key: &str, suffix: &str) -> String {
        if suffix.is_empty() {
            self.endpoint(&format!("issue/{key}"))
        } else {
            self.endpoint(&format!("issue/{key}/{suffix}"))
        }
    }

    async fn send(&self, action: &str, request: RequestBuilder) -> AppResult<Response> {
        let response = request
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira ({action}): {err}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{action}: {body}")));
        }
        Err(AppError::IssueTracker(format!(
            "Jira responded with {status} to {action}: {body}"
        )))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        action: &str,
        request: RequestBuilder,
    ) -> AppResult<T> {
        self.send(action, request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| {
                AppError::IssueTracker(format!("failed to parse Jira response ({action}): {err}"))
            })
    }
}

#[async_trait]
impl IssueReader for JiraClient {
    async fn get_issue(&self, key: &str) -> AppResult<IssueRecord> {
        let payload: JiraIssue = self
            .send_json("get issue", self.http.get(self.issue_endpoint(key, "")))
            .await?;
        Ok(IssueRecord {
            key: payload.key,
            id: payload.id,
            fields: payload.fields,
        })
    }

    async fn get_comment(&self, issue_key: &str, comment_id: &str) -> AppResult<Comment> {
        let url = self.issue_endpoint(issue_key, &format!("comment/{comment_id}"));
        self.send_json("get comment", self.http.get(url)).await
    }

    /// Jira caps the page size on its side, so pages are followed until
    /// `max_results` keys are collected or the result set is exhausted.
    async fn search(&self, jql: &str, max_results: usize) -> AppResult<Vec<String>> {
        let mut keys = Vec::new();
        while keys.len() < max_results {
            let request = JiraSearchRequest {
                jql,
                start_at: keys.len(),
                max_results: max_results - keys.len(),
                fields: ["key"],
            };
            let page: JiraSearchResponse = self
                .send_json(
                    "search issues",
                    self.http.post(self.endpoint("search")).json(&request),
                )
                .await?;
            if page.issues.is_empty() {
                break;
            }
            keys.extend(page.issues.into_iter().map(|issue| issue.key));
            if page.total.is_some_and(|total| keys.len() >= total) {
                break;
            }
        }
        keys.truncate(max_results);
        Ok(keys)
    }

    async fn transitions(&self, issue_key: &str) -> AppResult<Vec<Transition>> {
        let payload: JiraTransitions = self
            .send_json(
                "list transitions",
                self.http.get(self.issue_endpoint(issue_key, "transitions")),
            )
            .await?;
        Ok(payload.transitions)
    }

    async fn field_catalog(&self) -> AppResult<FieldCatalog> {
        let fields: Vec<JiraField> = self
            .send_json("list fields", self.http.get(self.endpoint("field")))
            .await?;
        Ok(FieldCatalog::new(
            fields.into_iter().map(|field| (field.id, field.name)),
        ))
    }
}

#[async_trait]
impl IssueWriter for JiraClient {
    async fn add_comment(&self, issue_key: &str, body: &str) -> AppResult<Comment> {
        let request = self
            .http
            .post(self.issue_endpoint(issue_key, "comment"))
            .json(&json!({ "body": body }));
        self.send_json("add comment", request).await
    }

    async fn update_comment(
        &self,
        issue_key: &str,
        comment_id: &str,
        body: &str,
    ) -> AppResult<Comment> {
        let request = self
            .http
            .put(self.issue_endpoint(issue_key, &format!("comment/{comment_id}")))
            .json(&json!({ "body": body }));
        self.send_json("update comment", request).await
    }

    async fn assign(&self, issue_key: &str, assignee: Option<&str>) -> AppResult<()> {
        let request = self
            .http
            .put(self.issue_endpoint(issue_key, "assignee"))
            .json(&json!({ "name": assignee }));
        self.send("assign issue", request).await?;
        Ok(())
    }

    async fn transition(
        &self,
        issue_key: &str,
        transition: &Transition,
        fields: &ResolvedFields,
        comment: Option<&str>,
    ) -> AppResult<()> {
        let mut payload = Map::new();
        payload.insert("transition".to_string(), json!({ "id": transition.id }));
        if !fields.is_empty() {
            payload.insert("fields".to_string(), Value::Object(fields.by_id()));
        }
        if let Some(comment) = comment {
            payload.insert(
                "update".to_string(),
                json!({ "comment": [{ "add": { "body": comment } }] }),
            );
        }

        let request = self
            .http
            .post(self.issue_endpoint(issue_key, "transitions"))
            .json(&payload);
        self.send("transition issue", request).await?;
        Ok(())
    }

    async fn update_fields(&self, issue_key: &str, fields: &ResolvedFields) -> AppResult<()> {
        let request = self
            .http
            .put(self.issue_endpoint(issue_key, ""))
            .json(&json!({ "fields": fields.by_id() }));
        self.send("update fields", request).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct JiraIssue {
    id: String,
    key: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraSearchRequest<'a> {
    jql: &'a str,
    start_at: usize,
    max_results: usize,
    fields: [&'static str; 1],
}

#[derive(Deserialize)]
struct JiraSearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssueKey>,
    total: Option<usize>,
}

#[derive(Deserialize)]
struct JiraIssueKey {
    key: String,
}

#[derive(Deserialize)]
struct JiraTransitions {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Deserialize)]
struct JiraField {
    id: String,
    name: String,
}
