// ABOUTME: SearchFilesTool - grep-like content search over text files.
// ABOUTME: Walks a directory with glob and matches lines with a regex.

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;

use crate::error::ToolError;
use crate::tool::{Args, Tool, required_str};

/// Tool for searching `.txt` files under a directory.
pub struct SearchFilesTool;

impl SearchFilesTool {
    fn is_text_file(path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
    }
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "search_files"
    }

    fn description(&self) -> &str {
        "Search for a regex pattern in the .txt files under a directory."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "path/to/directory"
                },
                "pattern": {
                    "type": "string",
                    "description": "regex or plain text to find"
                }
            },
            "required": ["directory", "pattern"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        let directory = required_str(&args, "directory")?;
        let pattern = required_str(&args, "pattern")?;

        // Patterns that are not valid regex are matched as plain text.
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(_) => Regex::new(&regex::escape(pattern))
                .map_err(|e| ToolError::InvalidArgument(format!("invalid pattern: {}", e)))?,
        };

        let full_pattern = format!("{}/**/*", glob::Pattern::escape(directory));
        let paths = glob::glob(&full_pattern)
            .map_err(|e| ToolError::InvalidArgument(format!("invalid directory: {}", e)))?;

        let mut results = Vec::new();
        // Unreadable entries are skipped.
        for path in paths.flatten().filter(|p| Self::is_text_file(p)) {
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (line_num, line) in content.lines().enumerate() {
                if regex.is_match(line) {
                    results.push(format!(
                        "{}:{}: {}",
                        path.display(),
                        line_num + 1,
                        line.trim()
                    ));
                }
            }
        }

        if results.is_empty() {
            Ok("No matches found".to_string())
        } else {
            Ok(format!(
                "Found {} matches:\n{}",
                results.len(),
                results.join("\n")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::args_from_value;
    use std::io::Write;
    use tempfile::TempDir;

    fn args(dir: &TempDir, pattern: &str) -> Args {
        args_from_value(serde_json::json!({
            "directory": dir.path().to_str().unwrap(),
            "pattern": pattern
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_finds_matches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Hello, world!").unwrap();
        writeln!(file, "Goodbye, world!").unwrap();
        writeln!(file, "Hello again!").unwrap();

        let result = SearchFilesTool.execute(args(&dir, "^Hello")).await.unwrap();

        assert!(result.starts_with("Found 2 matches"));
        assert!(result.contains("test.txt:3: Hello again!"));
    }

    #[tokio::test]
    async fn test_search_recurses_and_skips_other_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("notes.TXT"), "needle").unwrap();
        std::fs::write(dir.path().join("code.rs"), "needle").unwrap();

        let result = SearchFilesTool.execute(args(&dir, "needle")).await.unwrap();

        assert!(result.starts_with("Found 1 matches"));
        assert!(result.contains("notes.TXT"));
        assert!(!result.contains("code.rs"));
    }

    #[tokio::test]
    async fn test_search_no_matches() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("test.txt"), "Hello, world!").unwrap();

        let result = SearchFilesTool.execute(args(&dir, "foobar")).await.unwrap();

        assert_eq!(result, "No matches found");
    }

    #[tokio::test]
    async fn test_search_invalid_regex_matches_literally() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("langs.txt"), "C++ and foo(bar)\nRust").unwrap();

        let cpp = SearchFilesTool.execute(args(&dir, "C++")).await.unwrap();
        assert!(cpp.starts_with("Found 1 matches"));
        assert!(cpp.contains("langs.txt:1: C++ and foo(bar)"));

        let call = SearchFilesTool.execute(args(&dir, "foo(")).await.unwrap();
        assert!(call.starts_with("Found 1 matches"));

        let none = SearchFilesTool.execute(args(&dir, "[invalid")).await.unwrap();
        assert_eq!(none, "No matches found");
    }
}
