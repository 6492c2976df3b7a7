// ABOUTME: Defines all error types for the orchestra library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under OrchestraError.

use std::time::Duration;

/// Top-level error type for the orchestra library.
#[derive(Debug, thiserror::Error)]
pub enum OrchestraError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Tool call parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    /// A tool call inside a completion failed. `partial` holds the completion
    /// text with every earlier call already spliced in.
    #[error("error processing tool calls: {source}")]
    ToolCall {
        partial: String,
        #[source]
        source: Box<OrchestraError>,
    },
}

impl OrchestraError {
    /// Wrap a parse or execution failure together with the text spliced so far.
    pub fn tool_call(partial: impl Into<String>, source: impl Into<OrchestraError>) -> Self {
        Self::ToolCall {
            partial: partial.into(),
            source: Box::new(source.into()),
        }
    }

    /// The partially spliced completion text, if this is a tool call failure.
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            Self::ToolCall { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Errors from LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("no response from {provider}")]
    EmptyResponse { provider: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),

    #[error("{0} argument is required")]
    MissingArgument(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("upstream call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned no usable content: {0}")]
    NoContent(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("tool '{tool}' timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache error: {0}")]
    Cache(#[source] anyhow::Error),
}

impl ToolError {
    /// True for failures caused by the caller's arguments rather than the tool.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            ToolError::NotFound(_) | ToolError::MissingArgument(_) | ToolError::InvalidArgument(_)
        )
    }
}

/// Errors from scanning `[TOOL:name]...[/TOOL]` markers.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("tool marker at offset {offset} has no closing ']' before [/TOOL]")]
    MalformedMarker { offset: usize },

    #[error("error parsing tool arguments for '{tool}': {source}")]
    InvalidJson {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("arguments for '{tool}' must be a JSON object")]
    NotAnObject { tool: String },
}

/// Errors from building configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} not found in environment (required by {provider})")]
    MissingCredential {
        provider: &'static str,
        var: &'static str,
    },

    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Errors from the JSON-RPC tool host.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
