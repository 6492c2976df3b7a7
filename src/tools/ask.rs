// ABOUTME: AskTool - forwards a single question to one AI provider.
// ABOUTME: Registered as ask_<provider>; missing credentials fail without a network call.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::{ConfigError, ToolError};
use crate::llm::{Ask, ProviderKind};
use crate::tool::{Args, Tool, required_str};

/// A provider handle, or the configuration problem that prevents building one.
pub type AskBinding = Result<Arc<dyn Ask>, ConfigError>;

/// Bind `kind` to a live provider using the credentials in `config`.
pub fn bind(kind: ProviderKind, config: &Config) -> AskBinding {
    kind.provider(config).map(|p| Arc::new(p) as Arc<dyn Ask>)
}

/// Ask one provider a question.
pub struct AskTool {
    kind: ProviderKind,
    name: String,
    description: String,
    provider: AskBinding,
}

impl AskTool {
    /// Build the tool for `kind` from configuration.
    pub fn new(kind: ProviderKind, config: &Config) -> Self {
        Self::with_binding(kind, bind(kind, config))
    }

    /// Build the tool around an existing provider handle.
    pub fn with_binding(kind: ProviderKind, provider: AskBinding) -> Self {
        Self {
            kind,
            name: format!("ask_{}", kind.id()),
            description: format!("Ask questions to {}.", kind.display_name()),
            provider,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }
}

#[async_trait]
impl Tool for AskTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "your question"
                }
            },
            "required": ["question"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        let question = required_str(&args, "question")?;
        let provider = self.provider.as_ref().map_err(|e| e.clone())?;

        debug!(provider = self.kind.id(), "forwarding question");
        let answer = provider.ask(question).await?;
        Ok(format!("{} says: {}", self.kind.short_name(), answer))
    }
}
