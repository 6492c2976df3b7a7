// ABOUTME: Root module for orchestra - a tool-orchestration agent over AI providers.
// ABOUTME: Re-exports the agent, tools, provider clients and the JSON-RPC tool host.

pub mod agent;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod prelude;
pub mod tool;
pub mod tools;

pub use config::Config;
pub use error::OrchestraError;
