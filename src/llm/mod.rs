// ABOUTME: LLM module - client abstraction for language model providers.
// ABOUTME: Defines types, traits, provider implementations and the Ask capability.

mod anthropic;
mod client;
mod gemini;
mod huggingface;
mod openai;
mod provider;
mod types;

pub use anthropic::*;
pub use client::*;
pub use gemini::*;
pub use huggingface::*;
pub use openai::*;
pub use provider::*;
pub use types::*;
