// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use orchestra::prelude::*;` to get started quickly.

pub use crate::agent::{ConversationMemory, Orchestrator, OrchestratorBuilder, ToolInvocation};
pub use crate::cache::{FileCache, MemoryCache, TtlCache};
pub use crate::config::Config;
pub use crate::error::{ConfigError, LlmError, McpError, OrchestraError, ParseError, ToolError};
pub use crate::llm::{
    AnthropicClient, Ask, GeminiClient, HuggingFaceClient, LlmClient, Message, OpenAIClient,
    Provider, ProviderKind, Request, Response, Role, Usage,
};
pub use crate::mcp::McpServer;
pub use crate::tool::{Args, Registry, Tool};
pub use crate::tools::{
    AskTool, ComparisonTool, FileInfoTool, ListFilesTool, ReadFileTool, SearchFilesTool,
    WriteFileTool, ZipcodeTool, default_tools,
};
