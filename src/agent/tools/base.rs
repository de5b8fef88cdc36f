//! Base trait for agent tools.

use std::collections::HashMap;

use async_trait::async_trait;

/// Structured outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// A named capability exposed to the model.
///
/// Tools own their dependencies (policy, audit log, memory, session pool)
/// as shared references taken at construction. Every implementation writes
/// an audit entry before any side effect.
///
/// `execute` returns `Err` only for unexpected internal failures; expected
/// failures (policy denials, bad arguments, non-zero exits) come back as a
/// `ToolResult` with `success: false` so the model can see and react to
/// them. The dispatcher converts `Err` into a synthetic failure result —
/// no tool call ever aborts the agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable identifier the model emits in tool calls.
    fn name(&self) -> &str;

    /// Description shown in the system-prompt manifest.
    fn description(&self) -> &str;

    /// Execute the tool with the parsed JSON arguments.
    async fn execute(&self, args: HashMap<String, serde_json::Value>) -> anyhow::Result<ToolResult>;
}

/// Extract a required string argument, or produce the conventional
/// failure message.
pub fn require_str<'a>(
    args: &'a HashMap<String, serde_json::Value>,
    key: &str,
    tool: &str,
) -> Result<&'a str, ToolResult> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolResult::failure(format!("{}: '{}' parameter is required", tool, key)))
}

/// Extract an optional string argument with a default.
pub fn optional_str<'a>(
    args: &'a HashMap<String, serde_json::Value>,
    key: &str,
    default: &'a str,
) -> &'a str {
    args.get(key).and_then(|v| v.as_str()).unwrap_or(default)
}
