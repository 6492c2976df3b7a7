// ABOUTME: Google Gemini API client implementation.
// ABOUTME: Implements LlmClient trait for Gemini models.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{api_error, http_client, request_error};
use super::{LlmClient, Message, Request, Response, Role, Usage};
use crate::error::LlmError;

const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

/// Gemini content (message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Gemini content part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

/// Gemini generation config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsageMetadata>,
}

/// Gemini response candidate.
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: GeminiContent,
}

/// Gemini usage metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

/// Client for the Google Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
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

    /// Build the endpoint URL for a given model and method.
    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}

fn convert_message_to_content(msg: &Message) -> GeminiContent {
    let role = match msg.role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    };
    GeminiContent {
        role: Some(role.to_string()),
        parts: vec![GeminiPart {
            text: msg.content.clone(),
        }],
    }
}

impl From<&Request> for GeminiRequest {
    fn from(req: &Request) -> Self {
        let system_instruction = req.system_text().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text }],
        });

        let generation_config = if req.max_tokens.is_some() || req.temperature.is_some() {
            Some(GeminiGenerationConfig {
                max_output_tokens: req.max_tokens,
                temperature: req.temperature,
            })
        } else {
            None
        };

        GeminiRequest {
            contents: req.conversation().map(convert_message_to_content).collect(),
            system_instruction,
            generation_config,
        }
    }
}

fn convert_gemini_response(resp: GeminiResponse, model: String) -> Result<Response, LlmError> {
    let text = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| LlmError::EmptyResponse {
            provider: "Gemini".to_string(),
        })?;

    let usage = resp
        .usage_metadata
        .map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    Ok(Response {
        id: uuid::Uuid::new_v4().to_string(),
        text,
        model,
        usage,
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> &str {
        "Gemini"
    }

    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let body = GeminiRequest::from(req);
        let url = self.endpoint(&req.model, "generateContent");
        debug!(model = %req.model, contents = body.contents.len(), "sending gemini request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| request_error(e, self.timeout))?;
        convert_gemini_response(gemini_resp, req.model.clone())
    }
}
