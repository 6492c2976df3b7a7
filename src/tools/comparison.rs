// ABOUTME: ComparisonTool - fans one question out to several providers at once.
// ABOUTME: Per-provider failures are rendered inline; output keeps request order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::ask::{AskBinding, bind};
use crate::config::Config;
use crate::error::ToolError;
use crate::llm::{Ask, ProviderKind};
use crate::tool::{Args, Tool, required_str};

/// Providers queried when a request names none.
pub const DEFAULT_PROVIDERS: [&str; 3] = ["claude", "openai", "mistral"];

const DEFAULT_CONCURRENCY: usize = 3;
const DEFAULT_BRANCH_TIMEOUT: Duration = Duration::from_secs(120);

/// One provider's outcome within a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub provider: String,
    pub outcome: Result<String, String>,
}

impl ComparisonResult {
    fn text(&self) -> String {
        match &self.outcome {
            Ok(answer) => answer.clone(),
            Err(reason) => format!("Error: {}", reason),
        }
    }
}

/// Render a comparison digest.
pub fn render(question: &str, results: &[ComparisonResult]) -> String {
    let mut out = format!("AI Comparison for: \"{}\"", question);
    for result in results {
        out.push_str(&format!(
            "\n\n{}:\n{}",
            result.provider.to_uppercase(),
            result.text()
        ));
    }
    out
}

/// Ask several providers the same question and show the answers side by side.
pub struct ComparisonTool {
    providers: HashMap<String, AskBinding>,
    defaults: Vec<String>,
    concurrency: usize,
    branch_timeout: Duration,
}

impl Default for ComparisonTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonTool {
    /// An empty comparison tool with the default provider list.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            defaults: DEFAULT_PROVIDERS.iter().map(|s| s.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            branch_timeout: DEFAULT_BRANCH_TIMEOUT,
        }
    }

    /// Every known provider, bound with the credentials in `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut tool = Self::new()
            .with_concurrency(config.comparison_concurrency)
            .with_branch_timeout(config.tool_timeout);
        for kind in ProviderKind::ALL {
            tool = tool.with_binding(kind.id(), bind(kind, config));
        }
        tool
    }

    /// Register a provider under `id`.
    pub fn with_provider(self, id: impl Into<String>, provider: Arc<dyn Ask>) -> Self {
        self.with_binding(id, Ok(provider))
    }

    /// Register a provider binding, which may carry a configuration error.
    pub fn with_binding(mut self, id: impl Into<String>, binding: AskBinding) -> Self {
        self.providers.insert(id.into(), binding);
        self
    }

    /// Replace the providers used when a request names none.
    pub fn with_defaults<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn with_branch_timeout(mut self, timeout: Duration) -> Self {
        self.branch_timeout = timeout;
        self
    }

    /// Resolve the requested provider list, rejecting bad input before any call.
    fn requested(&self, args: &Args) -> Result<Vec<String>, ToolError> {
        let ids = match args.get("providers") {
            None | Some(Value::Null) => return Ok(self.defaults.clone()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ToolError::InvalidArgument(format!(
                            "providers must be strings, got {}",
                            item
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ToolError::InvalidArgument(format!(
                    "providers must be an array, got {}",
                    other
                )));
            }
        };

        if ids.is_empty() {
            return Err(ToolError::InvalidArgument(
                "providers must not be empty".to_string(),
            ));
        }
        if let Some(unknown) = ids.iter().find(|id| !self.providers.contains_key(*id)) {
            return Err(ToolError::InvalidArgument(format!(
                "unknown provider: {}",
                unknown
            )));
        }
        Ok(ids)
    }

    async fn query(&self, id: String, question: &str) -> ComparisonResult {
        let started = Instant::now();
        let outcome = match self.providers.get(&id) {
            None => Err(ToolError::NotFound(id.clone())),
            Some(Err(config)) => Err(ToolError::Config(config.clone())),
            Some(Ok(provider)) => {
                match tokio::time::timeout(self.branch_timeout, provider.ask(question)).await {
                    Ok(answer) => answer.map_err(ToolError::from),
                    Err(_) => Err(ToolError::Timeout {
                        tool: id.clone(),
                        after: self.branch_timeout,
                    }),
                }
            }
        };

        let elapsed = started.elapsed();
        match &outcome {
            Ok(_) => debug!(provider = %id, ?elapsed, "provider answered"),
            Err(e) => warn!(provider = %id, ?elapsed, error = %e, "provider failed"),
        }

        ComparisonResult {
            provider: id,
            outcome: outcome.map_err(|e| e.to_string()),
        }
    }

    /// Query every provider and collect results in request order.
    pub async fn compare(&self, question: &str, providers: Vec<String>) -> Vec<ComparisonResult> {
        info!(providers = providers.len(), concurrency = self.concurrency, "starting comparison");
        stream::iter(providers)
            .map(|id| self.query(id, question))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

#[async_trait]
impl Tool for ComparisonTool {
    fn name(&self) -> &str {
        "ai_comparison"
    }

    fn description(&self) -> &str {
        "Compare responses from multiple AI providers."
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "your question"
                },
                "providers": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "provider ids to query, in display order"
                }
            },
            "required": ["question"]
        })
    }

    fn example(&self) -> Value {
        serde_json::json!({
            "question": "your question",
            "providers": ["claude", "openai", "gemini"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        let question = required_str(&args, "question")?;
        let providers = self.requested(&args)?;
        let results = self.compare(question, providers).await;
        Ok(render(question, &results))
    }
}
