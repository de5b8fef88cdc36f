//! Shell execution tool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use super::base::{require_str, Tool, ToolResult};
use crate::agent::audit::AuditLog;
use crate::agent::policy::SecurityPolicy;

/// Tool to execute shell commands through `/bin/sh -c`, gated by the
/// security policy's command blocklist.
pub struct ShellTool {
    policy: Arc<SecurityPolicy>,
    audit: Arc<AuditLog>,
}

impl ShellTool {
    pub fn new(policy: Arc<SecurityPolicy>, audit: Arc<AuditLog>) -> Self {
        Self { policy, audit }
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace and return its output"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let command = match require_str(&args, "command", "shell") {
            Ok(c) => c,
            Err(result) => return Ok(result),
        };

        self.audit.append("shell", command);

        if !self.policy.allow_shell_command(command) {
            return Ok(ToolResult::failure(
                "shell: command blocked by security policy",
            ));
        }

        let output = Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .current_dir(self.policy.workspace_dir())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let text = if !stdout.is_empty() { stdout } else { stderr };

        if output.status.success() {
            Ok(ToolResult::success(text))
        } else {
            Ok(ToolResult::failure(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn make_tool() -> (TempDir, ShellTool, Arc<AuditLog>) {
        let tmp = TempDir::new().unwrap();
        let policy = Arc::new(SecurityPolicy::new(tmp.path().to_path_buf()));
        let audit = Arc::new(AuditLog::new(tmp.path()));
        let tool = ShellTool::new(policy, audit.clone());
        (tmp, tool, audit)
    }

    fn args(command: &str) -> HashMap<String, serde_json::Value> {
        let mut m = HashMap::new();
        m.insert("command".to_string(), json!(command));
        m
    }

    #[tokio::test]
    async fn test_runs_command_and_captures_stdout() {
        let (_tmp, tool, _audit) = make_tool();
        let result = tool.execute(args("printf hello")).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hello");
    }

    #[tokio::test]
    async fn test_failure_on_nonzero_exit() {
        let (_tmp, tool, _audit) = make_tool();
        let result = tool.execute(args("exit 3")).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_stderr_fallback() {
        let (_tmp, tool, _audit) = make_tool();
        let result = tool.execute(args("printf oops >&2")).await.unwrap();
        assert_eq!(result.output, "oops");
    }

    #[tokio::test]
    async fn test_blocked_command_denied_but_audited() {
        let (_tmp, tool, audit) = make_tool();
        let result = tool.execute(args("rm -rf /")).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("blocked"));
        // Denied calls still leave an audit trail.
        assert_eq!(audit.entry_count(), 1);
        assert!(audit.read_last(1).contains("rm -rf /"));
    }

    #[tokio::test]
    async fn test_missing_command_param() {
        let (_tmp, tool, _audit) = make_tool();
        let result = tool.execute(HashMap::new()).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("'command' parameter is required"));
    }

    #[tokio::test]
    async fn test_runs_in_workspace_dir() {
        let (tmp, tool, _audit) = make_tool();
        let result = tool.execute(args("pwd")).await.unwrap();
        let reported = result.output.trim();
        let workspace = tmp.path().canonicalize().unwrap();
        assert_eq!(
            std::path::Path::new(reported).canonicalize().unwrap(),
            workspace
        );
    }
}
