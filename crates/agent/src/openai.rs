//! Client for OpenAI-compatible chat-completions APIs (Groq, OpenAI, Ollama).

use std::time::Duration;

use async_trait::async_trait;
use maxim_core::config::{LlmConfig, LlmProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::llm::{CompletionRequest, LlmClient, LlmError};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OpenAiCompatClient {
    client: Client,
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OpenAiCompatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Unavailable(format!("http client setup failed: {error}")))?;

        let endpoint = format!("{}/chat/completions", config.resolved_base_url());
        debug!(
            provider = config.provider.as_str(),
            model = %config.model,
            endpoint = %endpoint,
            "created chat-completions client"
        );

        Ok(Self {
            client,
            provider: config.provider,
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn chat_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat { name: request.schema_name, schema: &request.schema },
            },
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let mut builder = self.client.post(&self.endpoint).json(&self.chat_request(request));
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.map_err(|source| {
            error!(
                event_name = "backend.request.failed",
                provider = self.provider.as_str(),
                error = %source,
                "chat-completions request failed"
            );
            classify_transport_error(source)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                event_name = "backend.request.rejected",
                provider = self.provider.as_str(),
                status = %status,
                body = %body,
                "chat-completions request returned an error status"
            );
            return Err(LlmError::Unavailable(format!("backend returned status {status}")));
        }

        let payload: ChatResponse = response.json().await.map_err(classify_transport_error)?;
        extract_content(payload)
    }
}

fn classify_transport_error(source: reqwest::Error) -> LlmError {
    if source.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Unavailable(source.to_string())
    }
}

fn extract_content(payload: ChatResponse) -> Result<String, LlmError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::Unavailable("backend reply carried no message content".to_string()))
}
