// ABOUTME: ListFilesTool - lists the entries of a directory.
// ABOUTME: Directories get a trailing slash; output is sorted by name.

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tool::{Args, Tool, required_str};

/// Tool for listing the entries of a directory.
pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files in a directory. Directories are shown with a trailing /."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "path/to/directory"
                }
            },
            "required": ["directory"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        let directory = required_str(&args, "directory")?;

        let mut entries = tokio::fs::read_dir(directory).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();

        if names.is_empty() {
            Ok("No files found".to_string())
        } else {
            Ok(names.join("\n"))
        }
    }
}
