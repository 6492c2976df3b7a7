// ABOUTME: ReadFileTool - reads file contents as text.
// ABOUTME: Fails with an IO error when the file cannot be read.

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tool::{Args, Tool, required_str};

/// Tool for reading file contents.
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file. Returns the file contents as text."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "path/to/file.txt"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        let path = required_str(&args, "file_path")?;
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
