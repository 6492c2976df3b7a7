// ABOUTME: Agent module - conversation memory, tool-call parsing and the orchestrator.
// ABOUTME: Composes the LLM client and tool registry into a multi-turn chat loop.

mod memory;
mod orchestrator;
mod parser;
mod prompt;

pub use memory::ConversationMemory;
pub use orchestrator::{CompletionSettings, Orchestrator, OrchestratorBuilder};
pub use parser::{CLOSE_MARKER, OPEN_MARKER, ToolCallScanner, ToolInvocation, parse};
pub use prompt::system_prompt;

#[cfg(test)]
mod orchestrator_test;
