//! Git-aware function-calling tools for LLM coding agents.
//!
//! `gitscribe` packages three single-purpose tools a host agent runtime can
//! register and dispatch:
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`ListChanges`](tools::changes::ListChanges) | `list_changes` | Diff every changed file in a working directory |
//! | [`ComposeCommitMessage`](tools::commit::ComposeCommitMessage) | `compose_commit_message` | Draft a conventional commit message from the working tree |
//! | [`WriteMarkdown`](tools::markdown::WriteMarkdown) | `write_markdown` | Write a Markdown file to disk |
//!
//! Each tool carries a [`ToolDef`] (name, description, and the JSON Schema
//! of its arguments, generated from a typed struct via [`json_schema_for`])
//! and an async `execute` returning the result string the host relays to the
//! model. Tools are collected into a
//! [`ToolSet`](tools::core::ToolSet) which handles dispatch, argument
//! validation, timing, and result truncation.
//!
//! # Getting started
//!
//! ```ignore
//! use gitscribe::tools::ScribeToolsExt;
//! use gitscribe::tools::core::ToolSet;
//!
//! let tools = ToolSet::new()
//!     .with_arg_validation(true)
//!     .with_scribe_tools("/path/to/project");
//!
//! // Export definitions for the function-calling API.
//! let defs = tools.definitions();
//!
//! // Dispatch a call the model made.
//! let result = tools.execute("list_changes", r#"{"rootDir": "."}"#).await;
//! ```
//!
//! The git queries behind `list_changes` and `compose_commit_message` live
//! in the `gitscribe-git` crate; everything there is read-only. The only
//! tool that touches disk is `write_markdown`.

pub mod tools;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Re-export schemars so downstream tools derive against the same version.
pub use schemars;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type implementing
/// `schemars::JsonSchema`. This is the bridge between typed argument
/// structs and the schema the function-calling API expects, so schema and
/// deserialization can never diverge.
///
/// # Example
///
/// ```
/// use gitscribe::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// #[serde(rename_all = "camelCase")]
/// struct Args {
///     root_dir: String,
///     #[serde(default)]
///     scope: Option<String>,
/// }
///
/// let schema = json_schema_for::<Args>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"rootDir".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Tool definition types ──────────────────────────────────────────

/// The type of a tool definition. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

/// Tool definition exported to the host (OpenAI function-calling format).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDef,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDef {
    /// Create a function-calling tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}
