// ABOUTME: MCP module - hosts registered tools over line-delimited JSON-RPC 2.0.
// ABOUTME: Exposes initialize, ping, tools/list and tools/call on any async stream.

mod server;
mod types;

pub use server::McpServer;
pub use types::*;
