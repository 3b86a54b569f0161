use std::sync::Arc;

use minijinja::context;
use serde_json::Value;

use crate::domain::classification::{Category, Classification};
use crate::domain::ticket::{EMAIL_BODY_FIELD, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::{CompletionFacade, LanguageModelService};
use crate::templating::render_template;

const SYSTEM_PROMPT_TEMPLATE: &str = r#"
As an AI assistant to a Security and Privacy Officer,
your task is to classify incoming email messages into relevant categories.
Only classify tickets in the two major classifications 'Security' and 'Privacy'. Use
the following guidelines:
{% for category in categories %}
{{ category.name }}-Related Queries:
- Classify as one of the following:
{% for label in category.labels %}  • {{ label }}
{% endfor %}  • If none fit, classify as "{{ category.generic }}".
{% endfor %}
Respond only in JSON format with fields for 'category', 'subcategory', 'why'
(explanation for your classification), and 'confidence' (your confidence level
in the classification).

Example:
{
  "category": "Security",
  "subcategory": "Phishing e-mails",
  "why": "The email contains characteristics of a phishing attempt, such as...",
  "confidence": "High"
}
"#;

pub fn system_prompt() -> AppResult<String> {
    let categories: Vec<_> = Category::ALL
        .iter()
        .map(|category| {
            context! {
                name => category.as_str(),
                generic => category.generic_label(),
                labels => category
                    .subcategories()
                    .iter()
                    .map(|(label, _)| *label)
                    .collect::<Vec<_>>(),
            }
        })
        .collect();
    render_template(SYSTEM_PROMPT_TEMPLATE, context! { categories => categories })
}

pub struct TicketClassifier {
    completion: CompletionFacade,
}

impl TicketClassifier {
    pub fn new(model: Arc<dyn LanguageModelService>) -> AppResult<Self> {
        Ok(Self {
            completion: CompletionFacade::new(model, system_prompt()?),
        })
    }

    pub async fn classify(&self, ticket: &Ticket) -> AppResult<Classification> {
        let body = ticket.field_str(EMAIL_BODY_FIELD).unwrap_or_default();
        let reply = self.completion.create_json_completion(body).await?;

        let category = Category::parse(required_str(&reply, "category")?)?;
        let subcategory = required_str(&reply, "subcategory")?;

        Ok(Classification {
            category,
            subcategory: subcategory.to_string(),
            mapped_subcategory: category.map_subcategory(subcategory),
            confidence: required_text(&reply, "confidence")?,
            rationale: required_text(&reply, "why")?,
        })
    }
}

fn required_str<'a>(reply: &'a Value, key: &str) -> AppResult<&'a str> {
    reply
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Parse(format!("classification is missing string field '{key}'")))
}

/// Any JSON value is accepted; non-strings are rendered as JSON text.
fn required_text(reply: &Value, key: &str) -> AppResult<String> {
    match reply.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(AppError::Parse(format!(
            "classification is missing field '{key}'"
        ))),
    }
}
