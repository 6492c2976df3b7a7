// ABOUTME: WriteFileTool - writes content to a file.
// ABOUTME: Creates parent directories if needed, overwrites existing files.

use std::path::Path;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tool::{Args, Tool, required_str};

/// Tool for writing content to files.
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates the file if it doesn't exist, overwrites if it does."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "path/to/file.txt"
                },
                "content": {
                    "type": "string",
                    "description": "text to write"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        let path = required_str(&args, "file_path")?;
        let content = required_str(&args, "content")?;

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(path, content).await?;
        Ok(format!(
            "Successfully wrote {} bytes to {}",
            content.len(),
            path
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::args_from_value;
    use tempfile::TempDir;

    fn args(path: &Path, content: &str) -> Args {
        args_from_value(serde_json::json!({
            "file_path": path.to_str().unwrap(),
            "content": content
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_write_file_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");

        let result = WriteFileTool
            .execute(args(&path, "Hello, world!"))
            .await
            .unwrap();

        assert!(result.contains("Successfully wrote 13 bytes"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello, world!");
    }

    #[tokio::test]
    async fn test_write_file_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dir").join("test.txt");

        WriteFileTool.execute(args(&path, "nested")).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "nested");
    }

    #[tokio::test]
    async fn test_write_file_requires_content() {
        let dir = TempDir::new().unwrap();
        let mut a = args(&dir.path().join("x.txt"), "");
        a.remove("content");

        let err = WriteFileTool.execute(a).await.unwrap_err();
        assert!(matches!(err, ToolError::MissingArgument(ref k) if k == "content"));
    }
}
