// ABOUTME: FileInfoTool - reports name, size, modification time and kind of a path.
// ABOUTME: Timestamps are rendered in local time with chrono.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::ToolError;
use crate::tool::{Args, Tool, required_str};

/// Tool for inspecting file metadata.
pub struct FileInfoTool;

#[async_trait]
impl Tool for FileInfoTool {
    fn name(&self) -> &str {
        "file_info"
    }

    fn description(&self) -> &str {
        "Get information about a file: size, modification time and whether it is a directory."
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
        let metadata = tokio::fs::metadata(path).await?;

        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        let modified: DateTime<Local> = metadata.modified()?.into();

        Ok(format!(
            "File: {}\nSize: {} bytes\nModified: {}\nIs Directory: {}\nRead Only: {}",
            name,
            metadata.len(),
            modified.format("%Y-%m-%d %H:%M:%S"),
            metadata.is_dir(),
            metadata.permissions().readonly()
        ))
    }
}
