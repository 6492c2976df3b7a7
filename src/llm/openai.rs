// ABOUTME: OpenAI chat-completions client implementation.
// ABOUTME: Also serves OpenAI-compatible endpoints such as Mistral.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{api_error, http_client, request_error};
use super::{LlmClient, Message, Request, Response, Usage};
use crate::error::LlmError;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI API request format.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// OpenAI message format.
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    pub usage: Option<OpenAIUsage>,
}

/// OpenAI response choice.
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    pub finish_reason: Option<String>,
}

/// OpenAI response message.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

/// OpenAI usage stats.
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl From<&Message> for OpenAIMessage {
    fn from(msg: &Message) -> Self {
        OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

impl From<&Request> for OpenAIRequest {
    fn from(req: &Request) -> Self {
        OpenAIRequest {
            model: req.model.clone(),
            messages: req.messages.iter().map(OpenAIMessage::from).collect(),
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        }
    }
}

/// Client for the OpenAI chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    provider: String,
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            provider: "OpenAI".to_string(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: http_client(DEFAULT_TIMEOUT),
        }
    }

    /// Create a client for Mistral's OpenAI-compatible endpoint.
    pub fn mistral(api_key: impl Into<String>) -> Self {
        let mut client = Self::new(api_key).with_base_url(MISTRAL_BASE_URL);
        client.provider = "Mistral".to_string();
        client
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.http = http_client(timeout);
        self
    }
}

fn convert_response(resp: OpenAIResponse, provider: &str) -> Result<Response, LlmError> {
    let text = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::EmptyResponse {
            provider: provider.to_string(),
        })?;

    let usage = resp
        .usage
        .map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(Response {
        id: resp.id,
        text,
        model: resp.model,
        usage,
    })
}

#[async_trait]
impl LlmClient for OpenAIClient {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let body = OpenAIRequest::from(req);
        let url = format!("{}/chat/completions", self.base_url);
        debug!(provider = %self.provider, model = %req.model, messages = req.messages.len(), "sending chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let resp: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| request_error(e, self.timeout))?;
        convert_response(resp, &self.provider)
    }
}
