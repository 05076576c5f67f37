//! `list_changes` — diff every changed file in a git working directory.

use gitscribe_git::{GitError, Workdir};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ToolDef;
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;

/// Paths skipped by the lister: build output and the dependency lock file.
/// A file is excluded when any component of its path equals an entry.
pub const EXCLUDED_FILES: &[&str] = &["target", "Cargo.lock"];

/// Arguments for `list_changes`.
#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListChangesArgs {
    /// Path to the repository working directory.
    pub root_dir: String,
}

/// One changed file and its unified diff.
#[derive(Debug, Serialize)]
pub struct ChangeEntry {
    pub file: String,
    pub diff: String,
}

/// List every changed file with its diff, excluding build artifacts.
pub struct ListChanges;

impl Tool for ListChanges {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::LIST_CHANGES)
            .purpose("List every changed file in a git working directory with its unified diff")
            .when_to_use(
                "When you need to inspect what changed and how, file by file, \
                 before reviewing or committing",
            )
            .when_not_to_use(
                "When you want a ready-made commit message — use \
                 compose_commit_message instead",
            )
            .parameters_for::<ListChangesArgs>()
            .example(
                "list_changes(rootDir='.')",
                r#"[{"file": "src/lib.rs", "diff": "diff --git a/src/lib.rs ..."}]"#,
            )
            .output_format(
                "JSON array of {file, diff} objects, in the repository's diff order",
            )
            .build()
            .to_tool_def()
    }

    fn cacheable(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: ListChangesArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            if args.root_dir.is_empty() {
                return "Error: 'rootDir' must not be empty".to_string();
            }

            // libgit2 is blocking; run the whole query sequence off the
            // async executor.
            let collected =
                tokio::task::spawn_blocking(move || collect_changes(&args.root_dir)).await;

            match collected {
                Ok(Ok(entries)) => serde_json::to_string_pretty(&entries)
                    .unwrap_or_else(|e| format!("Error: failed to encode result: {e}")),
                Ok(Err(e)) => format!("Error: {e}"),
                Err(e) => format!("Error: change listing failed: {e}"),
            }
        })
    }
}

/// Diff summary, then one per-file diff query per non-excluded file, in
/// summary order.
fn collect_changes(root_dir: &str) -> Result<Vec<ChangeEntry>, GitError> {
    let repo = Workdir::open(Path::new(root_dir))?;
    let summary = repo.diff_summary()?;

    let mut entries = Vec::new();
    for stat in summary {
        if is_excluded(&stat.file) {
            continue;
        }
        let diff = repo.file_diff(&stat.file)?;
        entries.push(ChangeEntry {
            file: stat.file,
            diff,
        });
    }
    Ok(entries)
}

fn is_excluded(path: &str) -> bool {
    path.split('/').any(|component| EXCLUDED_FILES.contains(&component))
}
