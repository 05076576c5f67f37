//! `compose_commit_message` — draft a conventional commit message from the
//! working tree.
//!
//! The subject is `type(scope): fragment`, where the fragment pluralizes
//! the status buckets ("1 new file, 2 updates") and the scope, when not
//! given explicitly, is the most frequent top-level path segment among the
//! changed files. The body summarizes per-file line stats and renames.

use gitscribe_git::{ChangeStat, GitError, Rename, RepoStatus, Workdir};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::ToolDef;
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;

/// Cap on per-file lines in the message body.
const MAX_SUMMARY_FILES: usize = 50;

/// Synthetic area for files with no path separator. A derived "root" scope
/// is rendered as no scope at all.
const ROOT_AREA: &str = "root";

/// Subject length limit applied when the caller gives none.
const DEFAULT_MAX_SUBJECT_LENGTH: usize = 72;

// ── Argument types ──────────────────────────────────────────────────

/// Conventional-commit types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    #[default]
    Chore,
    Revert,
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Chore => "chore",
            CommitType::Revert => "revert",
        };
        write!(f, "{name}")
    }
}

/// Arguments for `compose_commit_message`.
#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposeCommitMessageArgs {
    /// Path to the repository working directory.
    pub root_dir: String,
    /// Conventional-commit type for the subject.
    #[serde(rename = "type", default)]
    pub commit_type: CommitType,
    /// Explicit scope. When omitted, derived from the changed file paths.
    #[serde(default)]
    pub scope: Option<String>,
    /// Maximum subject length in characters.
    #[serde(default = "default_max_subject_length")]
    pub max_subject_length: usize,
}

fn default_max_subject_length() -> usize {
    DEFAULT_MAX_SUBJECT_LENGTH
}

#[derive(Serialize)]
struct ComposeResult {
    message: String,
}

// ── Tool ────────────────────────────────────────────────────────────

/// Draft a conventional commit message from status and diff summaries.
pub struct ComposeCommitMessage;

impl Tool for ComposeCommitMessage {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::COMPOSE_COMMIT_MESSAGE)
            .purpose("Draft a conventional commit message from the current working-tree changes")
            .when_to_use(
                "When you are about to commit and want a subject and summary \
                 body derived from what actually changed",
            )
            .when_not_to_use(
                "When you need the changed content itself — use list_changes instead. \
                 This tool does not create a commit",
            )
            .parameters_for::<ComposeCommitMessageArgs>()
            .example(
                "compose_commit_message(rootDir='.', type='feat', scope='tools')",
                r#"{"message": "feat(tools): 1 new file, 2 updates\n\nSummary of changes:\n..."}"#,
            )
            .output_format("JSON object with a single 'message' string")
            .build()
            .to_tool_def()
    }

    fn cacheable(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: ComposeCommitMessageArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            if args.root_dir.is_empty() {
                return "Error: 'rootDir' must not be empty".to_string();
            }
            if args.max_subject_length == 0 {
                return "Error: 'maxSubjectLength' must be a positive integer".to_string();
            }

            let root_dir = args.root_dir.clone();
            let snapshot = tokio::task::spawn_blocking(move || read_tree(&root_dir)).await;

            let (status, summary) = match snapshot {
                Ok(Ok(pair)) => pair,
                Ok(Err(e)) => return format!("Error: {e}"),
                Err(e) => return format!("Error: status read failed: {e}"),
            };

            let message = compose_message(
                args.commit_type,
                args.scope,
                args.max_subject_length,
                &status,
                &summary,
            );
            serde_json::to_string_pretty(&ComposeResult { message })
                .unwrap_or_else(|e| format!("Error: failed to encode result: {e}"))
        })
    }
}

fn read_tree(root_dir: &str) -> Result<(RepoStatus, Vec<ChangeStat>), GitError> {
    let repo = Workdir::open(Path::new(root_dir))?;
    let status = repo.status()?;
    let summary = repo.diff_summary()?;
    Ok((status, summary))
}

// ── Composition ─────────────────────────────────────────────────────

/// Assemble the full message: clamped subject, blank line, summary body.
fn compose_message(
    commit_type: CommitType,
    scope: Option<String>,
    max_subject_length: usize,
    status: &RepoStatus,
    summary: &[ChangeStat],
) -> String {
    let scope = scope
        .filter(|s| !s.is_empty())
        .or_else(|| derive_scope(summary));

    let fragment = summary_fragment(status);
    let subject = compose_subject(commit_type, scope.as_deref(), &fragment, max_subject_length);

    let mut lines = vec![subject];
    lines.extend(compose_body(summary, &status.renamed));
    lines.join("\n")
}

/// Most frequent top-level path segment among the changed files.
///
/// Files without a separator land in a synthetic "root" area. The strictly
/// highest tally wins, first-encountered area winning ties; a winning
/// "root" yields no scope.
fn derive_scope(summary: &[ChangeStat]) -> Option<String> {
    let mut areas: Vec<(&str, usize)> = Vec::new();
    for stat in summary {
        let area = match stat.file.split_once('/') {
            Some((head, _)) => head,
            None => ROOT_AREA,
        };
        match areas.iter_mut().find(|(a, _)| *a == area) {
            Some((_, count)) => *count += 1,
            None => areas.push((area, 1)),
        }
    }

    let mut winner: Option<(&str, usize)> = None;
    for (area, count) in areas {
        if winner.is_none_or(|(_, best)| count > best) {
            winner = Some((area, count));
        }
    }

    match winner {
        Some((area, _)) if area != ROOT_AREA => Some(area.to_string()),
        _ => None,
    }
}

/// Pluralized non-zero buckets, or "update files" when nothing is counted.
fn summary_fragment(status: &RepoStatus) -> String {
    let mut parts = Vec::new();
    if status.created > 0 {
        parts.push(pluralize(status.created, "new file", "new files"));
    }
    if status.modified > 0 {
        parts.push(pluralize(status.modified, "update", "updates"));
    }
    if status.deleted > 0 {
        parts.push(pluralize(status.deleted, "deletion", "deletions"));
    }
    if !status.renamed.is_empty() {
        parts.push(pluralize(status.renamed.len(), "rename", "renames"));
    }

    if parts.is_empty() {
        "update files".to_string()
    } else {
        parts.join(", ")
    }
}

fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// `type(scope): fragment`, clamped to `max_length` characters.
fn compose_subject(
    commit_type: CommitType,
    scope: Option<&str>,
    fragment: &str,
    max_length: usize,
) -> String {
    let subject = match scope {
        Some(scope) => format!("{commit_type}({scope}): {fragment}"),
        None => format!("{commit_type}: {fragment}"),
    };
    clamp_subject(subject.trim().to_string(), max_length)
}

/// Truncate to `max_length - 1` characters plus an ellipsis when too long.
/// Counts characters, not bytes, so the clamp never splits a code point.
fn clamp_subject(subject: String, max_length: usize) -> String {
    if subject.chars().count() <= max_length {
        return subject;
    }
    let mut clamped: String = subject.chars().take(max_length - 1).collect();
    clamped.push('…');
    clamped
}

/// Blank line, per-file summary (capped), and the rename block.
fn compose_body(summary: &[ChangeStat], renamed: &[Rename]) -> Vec<String> {
    let mut lines = vec![String::new()];

    if !summary.is_empty() {
        lines.push("Summary of changes:".to_string());
        for stat in summary.iter().take(MAX_SUMMARY_FILES) {
            lines.push(format!(
                "- {} (+{}/-{})",
                stat.file,
                stat.insertions.unwrap_or(0),
                stat.deletions.unwrap_or(0)
            ));
        }
        if summary.len() > MAX_SUMMARY_FILES {
            lines.push(format!(
                "... and {} more files",
                summary.len() - MAX_SUMMARY_FILES
            ));
        }
    }

    if !renamed.is_empty() {
        lines.push(String::new());
        lines.push("Renamed files:".to_string());
        for rename in renamed {
            lines.push(format!("- {} → {}", rename.from, rename.to));
        }
    }

    lines
}

// ── Tests ──────────────────────────────────────────────────────────
