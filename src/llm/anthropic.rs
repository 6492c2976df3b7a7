// ABOUTME: Anthropic Claude API client implementation.
// ABOUTME: Implements LlmClient trait for Claude models.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{api_error, http_client, request_error};
use super::{LlmClient, Message, Request, Response, Usage};
use crate::error::LlmError;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anthropic API request format.
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub messages: Vec<AnthropicMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Anthropic message format.
#[derive(Debug, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Anthropic content block.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    pub content: Vec<AnthropicContent>,
    pub model: String,
    pub usage: AnthropicUsage,
}

/// Anthropic usage stats.
#[derive(Debug, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl From<&Message> for AnthropicMessage {
    fn from(msg: &Message) -> Self {
        AnthropicMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

impl From<&Request> for AnthropicRequest {
    fn from(req: &Request) -> Self {
        AnthropicRequest {
            model: req.model.clone(),
            messages: req.conversation().map(AnthropicMessage::from).collect(),
            max_tokens: req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: req.system_text(),
            temperature: req.temperature,
        }
    }
}

impl TryFrom<AnthropicResponse> for Response {
    type Error = LlmError;

    fn try_from(resp: AnthropicResponse) -> Result<Self, Self::Error> {
        let text = resp
            .content
            .into_iter()
            .find_map(|c| match c {
                AnthropicContent::Text { text } => Some(text),
                AnthropicContent::Other => None,
            })
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: "Claude".to_string(),
            })?;

        Ok(Response {
            id: resp.id,
            text,
            model: resp.model,
            usage: Usage {
                input_tokens: resp.usage.input_tokens,
                output_tokens: resp.usage.output_tokens,
            },
        })
    }
}

/// Client for the Anthropic messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new Anthropic client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: http_client(DEFAULT_TIMEOUT),
        }
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

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> &str {
        "Claude"
    }

    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let body = AnthropicRequest::from(req);
        let url = format!("{}/v1/messages", self.base_url);
        debug!(model = %req.model, messages = body.messages.len(), "sending anthropic message");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let resp: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| request_error(e, self.timeout))?;
        Response::try_from(resp)
    }
}
