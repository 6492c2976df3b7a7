// ABOUTME: Tool module - defines the tool contract and the registry.
// ABOUTME: Core abstraction for agent capabilities.

mod registry;
mod traits;

pub use registry::*;
pub use traits::*;
