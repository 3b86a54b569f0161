use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::{CompletionParameters, OpenAiSettings};
use crate::error::{AppError, AppResult};
use crate::services::{LanguageModelService, ResponseFormat};

/// Chat completions against an Azure OpenAI deployment.
pub struct AzureOpenAiClient {
    http: Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    parameters: CompletionParameters,
}

impl AzureOpenAiClient {
    pub fn new(settings: &OpenAiSettings) -> Self {
        Self {
            http: Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            deployment: settings.deployment.clone(),
            api_version: settings.api_version.clone(),
            api_key: settings.key.clone(),
            parameters: settings.completion.clone(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }
}

#[async_trait]
impl LanguageModelService for AzureOpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        message: &str,
        format: ResponseFormat,
    ) -> AppResult<String> {
        let request = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: self.parameters.temperature,
            max_tokens: self.parameters.max_tokens,
            top_p: self.parameters.top_p,
            frequency_penalty: self.parameters.frequency_penalty,
            presence_penalty: self.parameters.presence_penalty,
            stop: None,
            response_format: match format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(ChatResponseFormat {
                    format_type: "json_object",
                }),
            },
        };

        let response = self
            .http
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                AppError::LanguageModel(format!("failed to call completion endpoint: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::LanguageModel(format!(
                "completion endpoint responded with {status}: {body}"
            )));
        }

        let payload: ChatResponse = response.json().await.map_err(|err| {
            AppError::LanguageModel(format!("failed to parse completion response: {err}"))
        })?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::LanguageModel("completion response contained no message".to_string())
            })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    fn settings(server: &MockServer) -> OpenAiSettings {
        OpenAiSettings {
            key: "azure-key".to_string(),
            endpoint: server.uri(),
            deployment: "gpt-4".to_string(),
            api_version: "2023-12-01-preview".to_string(),
            completion: CompletionParameters::default(),
        }
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        }))
    }

    #[tokio::test]
    async fn sends_prompt_and_default_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4/chat/completions"))
            .and(query_param("api-version", "2023-12-01-preview"))
            .and(header("api-key", "azure-key"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system", "content": "Be brief." },
                    { "role": "user", "content": "Hello" },
                ],
                "max_tokens": 800,
                "frequency_penalty": 0.0,
                "presence_penalty": 0.0,
                "stop": null,
            })))
            .respond_with(reply("Hi!"))
            .expect(1)
            .mount(&server)
            .await;

        let client = AzureOpenAiClient::new(&settings(&server));
        let text = client
            .complete("Be brief.", "Hello", ResponseFormat::Text)
            .await
            .unwrap();

        assert_eq!(text, "Hi!");
        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn json_mode_requests_json_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "response_format": { "type": "json_object" } })))
            .respond_with(reply(r#"{"category":"Privacy"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = AzureOpenAiClient::new(&settings(&server));
        let text = client
            .complete("classify", "mail", ResponseFormat::JsonObject)
            .await
            .unwrap();

        assert_eq!(text, r#"{"category":"Privacy"}"#);
    }

    #[tokio::test]
    async fn rejected_request_is_a_language_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let client = AzureOpenAiClient::new(&settings(&server));
        let err = client
            .complete("classify", "mail", ResponseFormat::Text)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LanguageModel(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = AzureOpenAiClient::new(&settings(&server));
        let err = client
            .complete("classify", "mail", ResponseFormat::Text)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LanguageModel(_)));
    }
}
