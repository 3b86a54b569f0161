//! In-memory fakes of the service traits, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::config::{AppConfig, CompletionParameters, JiraSettings, LoggingSettings, OpenAiSettings};
use crate::context::AppContext;
use crate::domain::comment::Comment;
use crate::domain::fields::{FieldCatalog, ResolvedFields};
use crate::domain::ticket::Transition;
use crate::error::{AppError, AppResult};
use crate::logging::IntentLog;
use crate::services::{
    IssueReader, IssueRecord, IssueTracker, IssueWriter, LanguageModelService, ResponseFormat,
};

pub const AUTOMATION_ACCOUNT: &str = "spo-automation";
pub const BODY_FIELD_ID: &str = "customfield_10400";

pub fn test_config(dryrun: bool) -> AppConfig {
    AppConfig {
        jira: JiraSettings {
            host: "https://jira.example.com".to_string(),
            username: AUTOMATION_ACCOUNT.to_string(),
            password: "secret".to_string(),
            dryrun,
        },
        openai: OpenAiSettings {
            key: "sk-test".to_string(),
            endpoint: "https://openai.example.com".to_string(),
            deployment: "gpt-4".to_string(),
            api_version: "2023-12-01-preview".to_string(),
            completion: CompletionParameters::default(),
        },
        logging: LoggingSettings::default(),
        source: "config.toml".into(),
    }
}

/// Context wired to a fake tracker and a scripted model. The fake serves reads
/// and records writes regardless of `dryrun`; only the facade's mode changes.
pub fn test_context<I, S>(
    dryrun: bool,
    responses: I,
) -> (AppContext, Arc<FakeTracker>, Arc<ScriptedModel>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fake = FakeTracker::new();
    let model = ScriptedModel::new(responses);
    let tracker = Arc::new(IssueTracker::new(fake.clone(), fake.clone(), dryrun));
    let ctx = AppContext::new(test_config(dryrun), tracker, model.clone());
    (ctx, fake, model)
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteCall {
    AddComment { key: String, body: String },
    UpdateComment { key: String, id: String, body: String },
    Assign { key: String, assignee: Option<String> },
    Transition { key: String, id: String, fields: Map<String, Value>, comment: Option<String> },
    UpdateFields { key: String, fields: Map<String, Value> },
}

#[derive(Default)]
struct FakeTrackerState {
    issues: HashMap<String, IssueRecord>,
    comments: HashMap<(String, String), Comment>,
    search_results: Vec<String>,
    transitions: Vec<Transition>,
    writes: Vec<WriteCall>,
    fail_writes: bool,
}

/// Serves issues from memory and records every write.
#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<FakeTrackerState>,
}

impl FakeTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_issue(&self, key: &str, body: &str, labels: &[&str], assignee: Option<&str>) {
        let mut fields = Map::new();
        fields.insert(BODY_FIELD_ID.to_string(), json!(body));
        fields.insert("labels".to_string(), json!(labels));
        fields.insert(
            "assignee".to_string(),
            assignee.map_or(Value::Null, |name| json!({ "name": name })),
        );
        let record = IssueRecord {
            key: key.to_string(),
            id: format!("1{}", self.state.lock().unwrap().issues.len()),
            fields,
        };
        let mut state = self.state.lock().unwrap();
        state.search_results.push(key.to_string());
        state.issues.insert(key.to_string(), record);
    }

    pub fn insert_comment(&self, key: &str, comment: Comment) {
        self.state
            .lock()
            .unwrap()
            .comments
            .insert((key.to_string(), comment.id.clone()), comment);
    }

    pub fn set_transitions(&self, transitions: Vec<Transition>) {
        self.state.lock().unwrap().transitions = transitions;
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn comments_for(&self, key: &str) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter_map(|call| match call {
                WriteCall::AddComment { key: k, body } if k == key => Some(body),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: WriteCall) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(AppError::IssueTracker("write rejected".to_string()));
        }
        state.writes.push(call);
        Ok(())
    }
}

#[async_trait]
impl IssueReader for FakeTracker {
    async fn get_issue(&self, key: &str) -> AppResult<IssueRecord> {
        self.state
            .lock()
            .unwrap()
            .issues
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("issue {key}")))
    }

    async fn get_comment(&self, issue_key: &str, comment_id: &str) -> AppResult<Comment> {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(&(issue_key.to_string(), comment_id.to_string()))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} on {issue_key}")))
    }

    async fn search(&self, _jql: &str, max_results: usize) -> AppResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.search_results.iter().take(max_results).cloned().collect())
    }

    async fn transitions(&self, _issue_key: &str) -> AppResult<Vec<Transition>> {
        Ok(self.state.lock().unwrap().transitions.clone())
    }

    async fn field_catalog(&self) -> AppResult<FieldCatalog> {
        Ok(FieldCatalog::new([
            ("labels".to_string(), "Labels".to_string()),
            (BODY_FIELD_ID.to_string(), "SPO: E-mail Body".to_string()),
            ("customfield_10600".to_string(), "SPO: Resolution Notes".to_string()),
        ]))
    }
}

#[async_trait]
impl IssueWriter for FakeTracker {
    async fn add_comment(&self, issue_key: &str, body: &str) -> AppResult<Comment> {
        self.record(WriteCall::AddComment {
            key: issue_key.to_string(),
            body: body.to_string(),
        })?;
        let mut comment = Comment::placeholder(body);
        comment.id = "20001".to_string();
        Ok(comment)
    }

    async fn update_comment(
        &self,
        issue_key: &str,
        comment_id: &str,
        body: &str,
    ) -> AppResult<Comment> {
        self.record(WriteCall::UpdateComment {
            key: issue_key.to_string(),
            id: comment_id.to_string(),
            body: body.to_string(),
        })?;
        let mut comment = Comment::placeholder(body);
        comment.id = comment_id.to_string();
        Ok(comment)
    }

    async fn assign(&self, issue_key: &str, assignee: Option<&str>) -> AppResult<()> {
        self.record(WriteCall::Assign {
            key: issue_key.to_string(),
            assignee: assignee.map(str::to_string),
        })
    }

    async fn transition(
        &self,
        issue_key: &str,
        transition: &Transition,
        fields: &ResolvedFields,
        comment: Option<&str>,
    ) -> AppResult<()> {
        self.record(WriteCall::Transition {
            key: issue_key.to_string(),
            id: transition.id.clone(),
            fields: fields.by_id(),
            comment: comment.map(str::to_string),
        })
    }

    async fn update_fields(&self, issue_key: &str, fields: &ResolvedFields) -> AppResult<()> {
        self.record(WriteCall::UpdateFields {
            key: issue_key.to_string(),
            fields: fields.by_id(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCall {
    pub system_prompt: String,
    pub message: String,
    pub format: ResponseFormat,
}

/// Replies with queued responses in order; errors once the queue runs dry.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<CompletionCall>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelService for ScriptedModel {
    async fn complete(
        &self,
        system_prompt: &str,
        message: &str,
        format: ResponseFormat,
    ) -> AppResult<String> {
        self.calls.lock().unwrap().push(CompletionCall {
            system_prompt: system_prompt.to_string(),
            message: message.to_string(),
            format,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::LanguageModel("no scripted response left".to_string()))
    }
}

/// Collects intents instead of emitting tracing events.
#[derive(Default)]
pub struct CapturedIntents {
    entries: Mutex<Vec<(String, String)>>,
}

impl CapturedIntents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl IntentLog for CapturedIntents {
    fn info(&self, issue_key: &str, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((issue_key.to_string(), message.to_string()));
    }

    fn detail(&self, issue_key: &str, message: &str) {
        self.info(issue_key, message);
    }
}
