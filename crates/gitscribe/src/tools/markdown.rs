//! `write_markdown` — write a Markdown file to disk.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ToolDef;
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;

/// Arguments for `write_markdown`.
#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WriteMarkdownArgs {
    /// Destination path. Must end in `.md`; relative paths resolve against
    /// the tool's working directory.
    pub file_path: String,
    /// Markdown content to write.
    #[serde(default)]
    pub content: String,
    /// Replace an existing file instead of failing.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteMarkdownResult {
    file_path: String,
    bytes_written: usize,
}

/// Write a Markdown file, creating missing parent directories.
///
/// Refuses non-`.md` targets and, unless `overwrite` is set, existing
/// files. Both checks run before anything touches the target.
pub struct WriteMarkdown {
    workdir: String,
}

impl WriteMarkdown {
    pub fn new(workdir: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl Tool for WriteMarkdown {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::WRITE_MARKDOWN)
            .purpose("Write a Markdown (.md) file to disk, creating parent directories as needed")
            .when_to_use(
                "When you need to persist notes, reports, or documentation as a \
                 Markdown file. Set overwrite=true to replace an existing file",
            )
            .when_not_to_use(
                "For any other file type — this tool only writes .md files. \
                 It does not append; an overwrite replaces the whole file",
            )
            .parameters_for::<WriteMarkdownArgs>()
            .example(
                "write_markdown(filePath='notes/review.md', content='# Review')",
                r#"{"filePath": "/work/notes/review.md", "bytesWritten": 8}"#,
            )
            .output_format("JSON object with the resolved filePath and bytesWritten")
            .build()
            .to_tool_def()
    }

    fn is_mutation(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let workdir = self.workdir.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: WriteMarkdownArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            if args.file_path.is_empty() {
                return "Error: 'filePath' must not be empty".to_string();
            }

            let resolved = resolve(&workdir, &args.file_path);
            if !is_markdown(&resolved) {
                return format!(
                    "Error: only .md files can be written (got '{}')",
                    resolved.display()
                );
            }

            if let Some(parent) = resolved.parent()
                && let Err(e) = fs::create_dir_all(parent).await
            {
                return format!("Error creating '{}': {e}", parent.display());
            }

            match fs::try_exists(&resolved).await {
                Ok(true) if !args.overwrite => {
                    return format!(
                        "Error: '{}' already exists; pass overwrite=true to replace it",
                        resolved.display()
                    );
                }
                Ok(_) => {}
                Err(e) => return format!("Error checking '{}': {e}", resolved.display()),
            }

            if let Err(e) = fs::write(&resolved, &args.content).await {
                return format!("Error writing '{}': {e}", resolved.display());
            }

            let result = WriteMarkdownResult {
                file_path: resolved.display().to_string(),
                bytes_written: args.content.len(),
            };
            serde_json::to_string_pretty(&result)
                .unwrap_or_else(|e| format!("Error: failed to encode result: {e}"))
        })
    }
}

/// Absolute paths pass through; relative paths join the working directory.
fn resolve(workdir: &str, file_path: &str) -> PathBuf {
    let path = Path::new(file_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(workdir).join(path)
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(dir: &Path) -> WriteMarkdown {
        WriteMarkdown::new(dir.to_string_lossy().to_string())
    }

    #[test]
    fn markdown_extension_check_is_case_insensitive() {
        assert!(is_markdown(Path::new("notes.md")));
        assert!(is_markdown(Path::new("NOTES.MD")));
        assert!(!is_markdown(Path::new("notes.txt")));
        assert!(!is_markdown(Path::new("notes")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn definition_requires_only_file_path() {
        let def = WriteMarkdown::new("/tmp").definition();
        assert_eq!(def.function.name, "write_markdown");
        let required = def.function.parameters["required"].as_array().unwrap();
        assert!(required.contains(&serde_json::json!("filePath")));
        assert!(!required.contains(&serde_json::json!("content")));
        assert!(!required.contains(&serde_json::json!("overwrite")));
        assert!(WriteMarkdown::new("/tmp").is_mutation());
    }

    #[tokio::test]
    async fn writes_file_and_reports_utf8_byte_length() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(dir.path())
            .execute(r#"{"filePath": "note.md", "content": "héllo"}"#)
            .await;

        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        // "héllo" is 5 characters but 6 bytes in UTF-8.
        assert_eq!(value["bytesWritten"], 6);

        let on_disk = std::fs::read_to_string(dir.path().join("note.md")).unwrap();
        assert_eq!(on_disk, "héllo");
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(dir.path())
            .execute(r#"{"filePath": "a/b/c/deep.md", "content": "x"}"#)
            .await;

        assert!(result.contains("bytesWritten"));
        assert!(dir.path().join("a/b/c/deep.md").is_file());
    }

    #[tokio::test]
    async fn content_defaults_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(dir.path())
            .execute(r#"{"filePath": "empty.md"}"#)
            .await;

        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["bytesWritten"], 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("empty.md")).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn rejects_non_markdown_path_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(dir.path())
            .execute(r##"{"filePath": "script.sh", "content": "#!/bin/sh"}"##)
            .await;

        assert!(result.contains("only .md files"));
        assert!(!dir.path().join("script.sh").exists());
    }

    #[tokio::test]
    async fn second_write_without_overwrite_fails_and_keeps_first_content() {
        let dir = tempfile::tempdir().unwrap();
        let t = tool(dir.path());

        t.execute(r#"{"filePath": "note.md", "content": "first"}"#)
            .await;
        let result = t
            .execute(r#"{"filePath": "note.md", "content": "second"}"#)
            .await;

        assert!(result.contains("already exists"));
        assert!(result.contains("note.md"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("note.md")).unwrap(),
            "first"
        );
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let t = tool(dir.path());

        t.execute(r#"{"filePath": "note.md", "content": "first"}"#)
            .await;
        let result = t
            .execute(r#"{"filePath": "note.md", "content": "rewritten", "overwrite": true}"#)
            .await;

        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["bytesWritten"], 9);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("note.md")).unwrap(),
            "rewritten"
        );
    }

    #[tokio::test]
    async fn absolute_paths_bypass_the_workdir() {
        let workdir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let target = elsewhere.path().join("abs.md");

        let args = format!(
            r#"{{"filePath": "{}", "content": "abs"}}"#,
            target.display()
        );
        let result = tool(workdir.path()).execute(&args).await;

        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["filePath"], target.display().to_string());
        assert!(target.is_file());
    }

    #[tokio::test]
    async fn rejects_empty_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(dir.path()).execute(r#"{"filePath": ""}"#).await;
        assert_eq!(result, "Error: 'filePath' must not be empty");
    }
}
