// ABOUTME: Orchestrator - the conversational agent that runs tool calls found in completions.
// ABOUTME: Owns memory and a frozen tool registry; one chat call is a sequential pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::memory::ConversationMemory;
use super::parser::{ToolCallScanner, ToolInvocation};
use super::prompt::system_prompt;
use crate::config::Config;
use crate::error::{ConfigError, LlmError, OrchestraError, ToolError};
use crate::llm::{LlmClient, Message, ProviderKind, Request, Role};
use crate::tool::{Registry, Tool};
use crate::tools::register_defaults;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f64 = 0.1;
const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Parameters for the backing model call and tool execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub completion_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// Collects tools and settings before an [`Orchestrator`] is built.
pub struct OrchestratorBuilder {
    client: Arc<dyn LlmClient>,
    settings: CompletionSettings,
    tools: Registry,
}

impl OrchestratorBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.settings.model = model.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.settings.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.settings.temperature = temperature;
        self
    }

    /// Bound the backing model call.
    pub fn completion_timeout(mut self, timeout: Duration) -> Self {
        self.settings.completion_timeout = timeout;
        self
    }

    /// Bound each tool execution.
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.settings.tool_timeout = timeout;
        self
    }

    /// Register a tool. A later tool with the same name replaces an earlier one.
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tool_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register_arc(tool);
        self
    }

    /// Register every tool from `registry`.
    pub fn tools(mut self, registry: &Registry) -> Self {
        for tool in registry.all() {
            self.tools.register_arc(tool);
        }
        self
    }

    /// Freeze the registry and render the system message.
    pub fn build(self) -> Orchestrator {
        let system_prompt = system_prompt(&self.tools);
        let id = Uuid::new_v4().to_string();
        info!(agent_id = %id, tools = self.tools.count(), model = %self.settings.model, "orchestrator ready");

        Orchestrator {
            id,
            client: self.client,
            settings: self.settings,
            tools: self.tools,
            memory: ConversationMemory::new(),
            system_prompt,
        }
    }
}

/// A multi-turn agent that lets its model call tools inline.
///
/// `chat` takes `&mut self`, so one conversation has at most one call in
/// flight.
pub struct Orchestrator {
    id: String,
    client: Arc<dyn LlmClient>,
    settings: CompletionSettings,
    tools: Registry,
    memory: ConversationMemory,
    system_prompt: String,
}

impl Orchestrator {
    pub fn builder(client: Arc<dyn LlmClient>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            client,
            settings: CompletionSettings::default(),
            tools: Registry::new(),
        }
    }

    /// The OpenAI-backed orchestrator with every built-in tool.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.require_openai_key()?;
        let client = ProviderKind::OpenAI.client(config)?;

        let mut tools = Registry::new();
        register_defaults(&mut tools, config);

        Ok(Self::builder(client)
            .model(&config.agent_model)
            .completion_timeout(config.request_timeout)
            .tool_timeout(config.tool_timeout)
            .tools(&tools)
            .build())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    pub fn tools(&self) -> &Registry {
        &self.tools
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Clear the conversation. Registered tools are unaffected.
    pub fn reset_memory(&mut self) {
        debug!(agent_id = %self.id, "memory cleared");
        self.memory.clear();
    }

    /// Send a user message and return the reply with every tool call resolved.
    ///
    /// The user message is recorded before the model is called and stays
    /// recorded if anything later fails. The assistant reply is recorded
    /// only on success.
    #[instrument(skip(self, message), fields(agent_id = %self.id))]
    pub async fn chat(&mut self, message: &str) -> Result<String, OrchestraError> {
        self.memory.append(Role::User, message);

        let completion = self.complete().await?;
        let reply = self.process_tool_calls(completion).await?;

        self.memory.append(Role::Assistant, reply.as_str());
        Ok(reply)
    }

    async fn complete(&self) -> Result<String, LlmError> {
        let request = Request::new(&self.settings.model)
            .message(Message::system(&self.system_prompt))
            .messages(self.memory.snapshot())
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature);

        let started = Instant::now();
        let response = tokio::time::timeout(
            self.settings.completion_timeout,
            self.client.create_message(&request),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.settings.completion_timeout))??;

        debug!(
            elapsed = ?started.elapsed(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );
        Ok(response.text)
    }

    /// Execute and splice every tool call in `completion`, left to right.
    ///
    /// On failure the error carries the text with the earlier calls
    /// already spliced in.
    pub async fn process_tool_calls(&self, completion: String) -> Result<String, OrchestraError> {
        let mut scanner = ToolCallScanner::new(completion);

        while let Some(next) = scanner.next_call() {
            let call = match next {
                Ok(call) => call,
                Err(e) => {
                    warn!(error = %e, "malformed tool call");
                    return Err(OrchestraError::tool_call(scanner.into_text(), e));
                }
            };

            match self.run_tool(&call).await {
                Ok(result) => scanner.splice(call.span.clone(), &result),
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "tool call failed");
                    return Err(OrchestraError::tool_call(scanner.into_text(), e));
                }
            }
        }

        Ok(scanner.into_text())
    }

    async fn run_tool(&self, call: &ToolInvocation) -> Result<String, ToolError> {
        let tool = self.tools.lookup(&call.name)?;
        let after = self.settings.tool_timeout;

        let started = Instant::now();
        let result = tokio::time::timeout(after, tool.execute(call.arguments.clone()))
            .await
            .map_err(|_| ToolError::Timeout {
                tool: call.name.clone(),
                after,
            })??;

        info!(tool = %call.name, elapsed = ?started.elapsed(), "tool executed");
        Ok(result)
    }
}
