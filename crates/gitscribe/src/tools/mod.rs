//! The gitscribe tool set.
//!
//! Three single-purpose tools, each a thin wrapper over the git query layer
//! or the filesystem:
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`ListChanges`] | `list_changes` | Diff every changed file in a working directory |
//! | [`ComposeCommitMessage`] | `compose_commit_message` | Draft a conventional commit message |
//! | [`WriteMarkdown`] | `write_markdown` | Write a Markdown file to disk |
//!
//! Register all three at once with [`ScribeToolsExt::with_scribe_tools`].
//!
//! # Submodules
//!
//! - [`core`] — [`Tool`](core::Tool) trait and [`ToolSet`](core::ToolSet)
//!   dispatch.
//! - [`spec`] — [`ToolSpec`](spec::ToolSpec) builder for structured tool
//!   descriptions.
//! - [`changes`], [`commit`], [`markdown`] — the tool implementations.

pub mod changes;
pub mod commit;
pub mod core;
pub mod markdown;
pub mod spec;

pub use changes::ListChanges;
pub use commit::ComposeCommitMessage;
pub use markdown::WriteMarkdown;

// ── Tool name constants ─────────────────────────────────────────────

pub const LIST_CHANGES: &str = "list_changes";
pub const COMPOSE_COMMIT_MESSAGE: &str = "compose_commit_message";
pub const WRITE_MARKDOWN: &str = "write_markdown";

// ── Extension trait ─────────────────────────────────────────────────

/// Register the gitscribe tools on a [`ToolSet`](core::ToolSet).
///
/// `workdir` is the directory relative Markdown paths resolve against;
/// hosts pass their process working directory. The git tools take their
/// repository root per call via the `rootDir` argument instead.
///
/// # Example
///
/// ```ignore
/// use gitscribe::tools::ScribeToolsExt;
/// use gitscribe::tools::core::ToolSet;
///
/// let tools = ToolSet::new().with_scribe_tools(".");
/// ```
pub trait ScribeToolsExt {
    fn with_scribe_tools(self, workdir: impl Into<String>) -> Self;
}

impl ScribeToolsExt for core::ToolSet {
    fn with_scribe_tools(self, workdir: impl Into<String>) -> Self {
        self.with(ListChanges)
            .with(ComposeCommitMessage)
            .with(WriteMarkdown::new(workdir))
    }
}
