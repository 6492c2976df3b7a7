// ABOUTME: Provider catalogue and the single-question Ask capability.
// ABOUTME: Binds a client to a model and builds clients from explicit Config.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{
    AnthropicClient, GeminiClient, HuggingFaceClient, LlmClient, Message, OpenAIClient, Request,
};
use crate::config::Config;
use crate::error::{ConfigError, LlmError};

const ASK_MAX_TOKENS: u32 = 1000;

/// Something that can answer a single question.
#[async_trait]
pub trait Ask: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, LlmError>;
}

/// The AI providers the tools know how to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Claude,
    OpenAI,
    Gemini,
    Mistral,
    HuggingFace,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Claude,
        ProviderKind::OpenAI,
        ProviderKind::Gemini,
        ProviderKind::Mistral,
        ProviderKind::HuggingFace,
    ];

    /// Identifier used in comparison requests and tool names.
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Mistral => "mistral",
            ProviderKind::HuggingFace => "huggingface",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "Claude AI (Anthropic)",
            ProviderKind::OpenAI => "OpenAI GPT",
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::Mistral => "Mistral AI",
            ProviderKind::HuggingFace => "Hugging Face models",
        }
    }

    /// Short label used when quoting an answer.
    pub fn short_name(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "Claude",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Mistral => "Mistral",
            ProviderKind::HuggingFace => "Hugging Face",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude-3-haiku-20240307",
            ProviderKind::OpenAI => "gpt-3.5-turbo",
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::Mistral => "mistral-tiny",
            ProviderKind::HuggingFace => "microsoft/DialoGPT-medium",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "CLAUDE_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Mistral => "MISTRAL_API_KEY",
            ProviderKind::HuggingFace => "HUGGINGFACEHUB_API_TOKEN",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    fn credential<'a>(&self, config: &'a Config) -> Option<&'a str> {
        match self {
            ProviderKind::Claude => config.claude_api_key.as_deref(),
            ProviderKind::OpenAI => config.openai_api_key.as_deref(),
            ProviderKind::Gemini => config.gemini_api_key.as_deref(),
            ProviderKind::Mistral => config.mistral_api_key.as_deref(),
            ProviderKind::HuggingFace => config.huggingface_api_token.as_deref(),
        }
    }

    /// Build a client for this provider from `config`.
    pub fn client(&self, config: &Config) -> Result<Arc<dyn LlmClient>, ConfigError> {
        let key = self
            .credential(config)
            .ok_or(ConfigError::MissingCredential {
                provider: self.id(),
                var: self.credential_var(),
            })?;
        let timeout = config.request_timeout;

        let client: Arc<dyn LlmClient> = match self {
            ProviderKind::Claude => Arc::new(AnthropicClient::new(key).with_timeout(timeout)),
            ProviderKind::OpenAI => Arc::new(OpenAIClient::new(key).with_timeout(timeout)),
            ProviderKind::Gemini => Arc::new(GeminiClient::new(key).with_timeout(timeout)),
            ProviderKind::Mistral => Arc::new(OpenAIClient::mistral(key).with_timeout(timeout)),
            ProviderKind::HuggingFace => {
                Arc::new(HuggingFaceClient::new(key).with_timeout(timeout))
            }
        };
        Ok(client)
    }

    /// Build a provider bound to this kind's default model.
    pub fn provider(&self, config: &Config) -> Result<Provider, ConfigError> {
        Ok(Provider::new(self.client(config)?, self.default_model()))
    }
}

/// A client bound to one model.
#[derive(Clone)]
pub struct Provider {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl Provider {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Ask for Provider {
    async fn ask(&self, question: &str) -> Result<String, LlmError> {
        let request = Request::new(&self.model)
            .message(Message::user(question))
            .max_tokens(ASK_MAX_TOKENS);

        debug!(provider = %self.client.provider(), model = %self.model, "asking provider");
        let response = self.client.create_message(&request).await?;

        if response.text.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: self.client.provider().to_string(),
            });
        }
        Ok(response.text)
    }
}
