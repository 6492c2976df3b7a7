// ABOUTME: Defines the LlmClient trait - the abstraction layer that lets the
// ABOUTME: orchestrator and the ask tools work with any completion provider.

use std::time::Duration;

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// Trait for LLM client implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn provider(&self) -> &str;

    /// Create a message (non-streaming).
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}

/// Build the HTTP client shared by the provider implementations.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Turn a non-success HTTP response into an API error.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    LlmError::Api { status, message }
}

/// Map reqwest timeouts onto the dedicated error variant.
pub(crate) fn request_error(err: reqwest::Error, timeout: Duration) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(timeout)
    } else {
        LlmError::Http(err)
    }
}
