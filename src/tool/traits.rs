// ABOUTME: Defines the Tool trait - the core abstraction for agent capabilities.
// ABOUTME: Tools have a name, description, schema, example arguments and an async execute.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;

/// Arguments passed to a tool: a JSON object decoded into a map.
pub type Args = serde_json::Map<String, Value>;

/// A tool that can be executed by an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> Value;

    /// Example arguments shown to the model in the system message.
    ///
    /// Defaults to each schema property mapped to its description.
    fn example(&self) -> Value {
        let mut example = serde_json::Map::new();
        if let Some(props) = self.schema().get("properties").and_then(Value::as_object) {
            for (key, prop) in props {
                let hint = prop
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("value");
                example.insert(key.clone(), Value::String(hint.to_string()));
            }
        }
        Value::Object(example)
    }

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Args) -> Result<String, ToolError>;
}

/// Fetch a required string argument.
pub fn required_str<'a>(args: &'a Args, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) | None => Err(ToolError::MissingArgument(key.to_string())),
        Some(other) => Err(ToolError::InvalidArgument(format!(
            "{} must be a string, got {}",
            key, other
        ))),
    }
}

/// Fetch an optional string argument; absent or null yields `None`.
pub fn optional_str<'a>(args: &'a Args, key: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(key) {
        Some(Value::Null) | None => Ok(None),
        Some(_) => required_str(args, key).map(Some),
    }
}

/// Build an argument map from a JSON value; anything but an object is rejected.
pub fn args_from_value(value: Value) -> Result<Args, ToolError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Args::new()),
        other => Err(ToolError::InvalidArgument(format!(
            "arguments must be a JSON object, got {}",
            other
        ))),
    }
}
