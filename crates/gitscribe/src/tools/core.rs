//! Tool abstraction and dispatch.
//!
//! The [`Tool`] trait is the unit of capability: a static definition (name,
//! description, JSON Schema) plus an async `execute`. A [`ToolSet`] collects
//! tools and handles dispatch: argument validation, call logging, timing,
//! optional timeouts, and result truncation.

use crate::ToolDef;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info, trace};

/// Maximum size (in bytes) for a tool result before truncation.
pub const DEFAULT_MAX_RESULT_BYTES: usize = 30_000;

/// Boxed future returned by [`Tool::execute`].
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = String> + Send + 'a>>;

// ── Tool trait ─────────────────────────────────────────────────────

/// A tool an LLM agent can invoke via function-calling.
///
/// Implementors provide a definition describing name, description, and the
/// JSON Schema of the arguments, and an async [`Tool::execute`] that
/// receives the raw JSON arguments string. Failures are returned as
/// `"Error: ..."` strings rather than panics; the host passes the string
/// back to the model either way.
pub trait Tool: Send + Sync {
    /// The definition exported to the function-calling API.
    fn definition(&self) -> ToolDef;

    /// Execute with the given raw JSON arguments string.
    ///
    /// Boxed future so the trait stays dyn-compatible.
    fn execute(&self, arguments: &str) -> ToolFuture<'_>;

    /// The tool's name (delegates to the definition).
    fn name(&self) -> String {
        self.definition().function.name.clone()
    }

    /// Whether results are cacheable by the host (read-only queries that
    /// are deterministic for the same arguments while external state holds
    /// still). Defaults to `false`.
    fn cacheable(&self) -> bool {
        false
    }

    /// Whether this tool mutates external state. Defaults to `false`.
    fn is_mutation(&self) -> bool {
        false
    }
}

// ── ToolSet ────────────────────────────────────────────────────────

/// A collection of tools dispatched by name.
///
/// ```ignore
/// let tools = ToolSet::new()
///     .with_arg_validation(true)
///     .with(ListChanges)
///     .with(WriteMarkdown::new("."));
///
/// let defs = tools.definitions();
/// let result = tools.execute("list_changes", r#"{"rootDir": "."}"#).await;
/// ```
pub struct ToolSet {
    tools: HashMap<String, Box<dyn Tool>>,
    max_result_bytes: usize,
    /// Validate arguments against each tool's JSON Schema before execution.
    validate_args: bool,
    /// Timeout applied to every execution. `None` disables timeouts.
    default_timeout: Option<std::time::Duration>,
    cacheable_tools: HashSet<String>,
    mutation_tools: HashSet<String>,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("max_result_bytes", &self.max_result_bytes)
            .finish()
    }
}

impl ToolSet {
    /// Create an empty tool set.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            validate_args: false,
            default_timeout: None,
            cacheable_tools: HashSet::new(),
            mutation_tools: HashSet::new(),
        }
    }

    /// Set the maximum result size in bytes before truncation.
    pub fn with_max_result_bytes(mut self, max: usize) -> Self {
        self.max_result_bytes = max;
        self
    }

    /// Enable JSON Schema argument validation before execution.
    pub fn with_arg_validation(mut self, enabled: bool) -> Self {
        self.validate_args = enabled;
        self
    }

    /// Apply a timeout to every execution. `None` disables timeouts.
    pub fn with_default_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name();
        if tool.cacheable() {
            self.cacheable_tools.insert(name.clone());
        }
        if tool.is_mutation() {
            self.mutation_tools.insert(name.clone());
        }
        self.tools.insert(name, Box::new(tool));
    }

    /// Register a tool (builder pattern).
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// All tool definitions, for export to the function-calling API.
    pub fn definitions(&self) -> Vec<ToolDef> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Whether a tool's results are cacheable by the host.
    pub fn is_cacheable(&self, tool_name: &str) -> bool {
        self.cacheable_tools.contains(tool_name)
    }

    /// Whether a tool mutates external state.
    pub fn is_mutation_tool(&self, tool_name: &str) -> bool {
        self.mutation_tools.contains(tool_name)
    }

    /// Execute a tool call by name.
    ///
    /// With validation enabled, arguments are checked against the tool's
    /// declared schema first and a structured error is returned on mismatch
    /// so the model can self-correct. The result is truncated to the set's
    /// byte cap. Unknown names produce an error string.
    pub async fn execute(&self, name: &str, arguments: &str) -> String {
        let tool = match self.tools.get(name) {
            Some(t) => t,
            None => return format!("Error: unknown tool '{name}'"),
        };

        if self.validate_args
            && let Some(error) = validate_tool_arguments(tool.as_ref(), arguments)
        {
            return error;
        }

        log_tool_call(name, arguments);
        let start = std::time::Instant::now();

        let result = if let Some(limit) = self.default_timeout {
            match tokio::time::timeout(limit, tool.execute(arguments)).await {
                Ok(r) => r,
                Err(_) => {
                    info!(
                        "Tool {name} timed out after {:.1}s (limit: {:.0}s)",
                        start.elapsed().as_secs_f64(),
                        limit.as_secs_f64(),
                    );
                    format!(
                        "Error: tool '{name}' timed out after {:.0} seconds",
                        limit.as_secs_f64(),
                    )
                }
            }
        } else {
            tool.execute(arguments).await
        };

        debug!(
            "Tool {name} completed in {:.0}ms ({} bytes)",
            start.elapsed().as_secs_f64() * 1000.0,
            result.len()
        );
        trace!(
            "Tool {name} result preview: {}",
            result.chars().take(300).collect::<String>()
        );

        truncate_result(result, self.max_result_bytes)
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Validate arguments against a tool's declared JSON Schema.
///
/// Returns `None` when valid, or `Some(error_string)` formatted for the
/// model to self-correct.
pub fn validate_tool_arguments(tool: &dyn Tool, arguments: &str) -> Option<String> {
    let args_value: serde_json::Value = match serde_json::from_str(arguments) {
        Ok(v) => v,
        Err(e) => {
            return Some(format!(
                "Error: invalid JSON arguments for tool '{}': {e}. \
                 Provide valid JSON matching the tool's parameter schema.",
                tool.name()
            ));
        }
    };

    let schema = tool.definition().function.parameters;
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        // An invalid schema is a registration bug, not a caller error.
        Err(_) => return None,
    };

    let errors: Vec<String> = validator
        .iter_errors(&args_value)
        .map(|e| format!("  - {}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(format!(
            "Error: argument validation failed for tool '{}':\n{}\n\
             Fix the arguments and try again.",
            tool.name(),
            errors.join("\n")
        ))
    }
}

/// Log a tool call at INFO with a truncated preview of the arguments.
pub fn log_tool_call(name: &str, arguments: &str) {
    let preview: String = arguments.chars().take(120).collect();
    info!(
        "[tool] {name}({preview}{})",
        if arguments.len() > 120 { "..." } else { "" }
    );
    trace!("[tool] {name} arguments: {arguments}");
}

/// Truncate a string to at most `max` bytes, appending a notice if trimmed.
pub fn truncate_result(s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let total = s.len();
    let mut cut = max;
    // Back up to a char boundary.
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = s;
    out.truncate(cut);
    out.push_str(&format!("...\n[truncated: {total} bytes total]"));
    out
}

/// Parse raw JSON arguments into a typed struct.
///
/// The error string is ready to return directly from [`Tool::execute`].
pub fn parse_tool_args<T: serde::de::DeserializeOwned>(arguments: &str) -> Result<T, String> {
    serde_json::from_str(arguments).map_err(|e| {
        format!(
            "Error: invalid tool arguments: {e}. \
             Provide valid JSON matching the tool's parameter schema."
        )
    })
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    impl Tool for EchoTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new(
                "echo",
                "Echo the input",
                serde_json::json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
            )
        }

        fn execute(&self, arguments: &str) -> ToolFuture<'_> {
            let text = serde_json::from_str::<serde_json::Value>(arguments)
                .ok()
                .and_then(|v| v["text"].as_str().map(str::to_string))
                .unwrap_or_else(|| "Error: no text".into());
            Box::pin(async move { text })
        }

        fn cacheable(&self) -> bool {
            true
        }
    }

    struct SlowTool;

    impl Tool for SlowTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new(
                "slow",
                "Sleeps forever",
                serde_json::json!({"type": "object", "properties": {}}),
            )
        }

        fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
            Box::pin(async {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                "done".into()
            })
        }
    }

    #[test]
    fn tool_name_comes_from_definition() {
        assert_eq!(EchoTool.name(), "echo");
    }

    #[test]
    fn register_and_export_definitions() {
        let set = ToolSet::new().with(EchoTool);
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(set.definitions().iter().any(|d| d.function.name == "echo"));
    }

    #[test]
    fn cacheable_flag_is_tracked() {
        let set = ToolSet::new().with(EchoTool);
        assert!(set.is_cacheable("echo"));
        assert!(!set.is_mutation_tool("echo"));
    }

    #[tokio::test]
    async fn execute_known_tool() {
        let set = ToolSet::new().with(EchoTool);
        let result = set.execute("echo", r#"{"text": "hello"}"#).await;
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn execute_unknown_tool() {
        let set = ToolSet::new().with(EchoTool);
        let result = set.execute("nope", "{}").await;
        assert!(result.contains("unknown tool"));
    }

    #[tokio::test]
    async fn validation_rejects_missing_required_field() {
        let set = ToolSet::new().with_arg_validation(true).with(EchoTool);
        let result = set.execute("echo", "{}").await;
        assert!(result.contains("argument validation failed"));
    }

    #[tokio::test]
    async fn validation_rejects_malformed_json() {
        let set = ToolSet::new().with_arg_validation(true).with(EchoTool);
        let result = set.execute("echo", "not json").await;
        assert!(result.contains("invalid JSON arguments"));
    }

    #[tokio::test]
    async fn timeout_cuts_off_slow_tool() {
        let set = ToolSet::new()
            .with_default_timeout(Some(std::time::Duration::from_millis(20)))
            .with(SlowTool);
        let result = set.execute("slow", "{}").await;
        assert!(result.contains("timed out"));
    }

    #[tokio::test]
    async fn long_results_are_truncated() {
        struct BigTool;
        impl Tool for BigTool {
            fn definition(&self) -> ToolDef {
                ToolDef::new(
                    "big",
                    "Returns a big result",
                    serde_json::json!({"type": "object", "properties": {}}),
                )
            }
            fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
                Box::pin(async { "a".repeat(200) })
            }
        }

        let set = ToolSet::new().with_max_result_bytes(50).with(BigTool);
        let result = set.execute("big", "{}").await;
        assert!(result.contains("[truncated: 200 bytes total]"));
    }

    #[test]
    fn truncate_short_unchanged() {
        assert_eq!(truncate_result("hello".into(), 100), "hello");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(40); // 2 bytes per char
        let result = truncate_result(s, 33);
        assert!(result.starts_with(&"é".repeat(16)));
        assert!(result.contains("[truncated: 80 bytes total]"));
    }

    #[test]
    fn parse_tool_args_reports_schema_hint() {
        #[derive(serde::Deserialize, Debug)]
        struct Args {
            #[allow(dead_code)]
            text: String,
        }
        let err = parse_tool_args::<Args>("{}").unwrap_err();
        assert!(err.starts_with("Error: invalid tool arguments"));
    }
}
