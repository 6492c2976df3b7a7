// ABOUTME: Hugging Face inference API client implementation.
// ABOUTME: Sends the latest user message as `inputs` and reads `generated_text`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{api_error, http_client, request_error};
use super::{LlmClient, Request, Response, Usage};
use crate::error::LlmError;

const HUGGINGFACE_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hugging Face inference request.
#[derive(Debug, Serialize)]
pub struct HuggingFaceRequest {
    pub inputs: String,
}

/// One generated sequence.
#[derive(Debug, Deserialize)]
pub struct HuggingFaceGeneration {
    #[serde(default)]
    pub generated_text: String,
}

/// Client for text-generation models on the Hugging Face inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    api_token: String,
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HuggingFaceClient {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: HUGGINGFACE_BASE_URL.to_string(),
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
impl LlmClient for HuggingFaceClient {
    fn provider(&self) -> &str {
        "Hugging Face"
    }

    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        // The inference endpoint is not conversational; only the latest turn is sent.
        let body = HuggingFaceRequest {
            inputs: req.last_user_text().unwrap_or_default().to_string(),
        };
        let url = format!("{}/models/{}", self.base_url, req.model);
        debug!(model = %req.model, "sending hugging face inference request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let generations: Vec<HuggingFaceGeneration> = response
            .json()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let text = generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: "Hugging Face".to_string(),
            })?;

        Ok(Response {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            model: req.model.clone(),
            usage: Usage::default(),
        })
    }
}
