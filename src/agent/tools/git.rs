//! Git operations tool.
//!
//! The argv is built explicitly and handed to the process spawner — no
//! shell is ever involved, so metacharacters in `args` are inert tokens
//! that git itself rejects.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use super::base::{optional_str, require_str, Tool, ToolResult};
use crate::agent::audit::AuditLog;
use crate::agent::policy::SecurityPolicy;

/// Git subcommands the model is allowed to run.
const ALLOWED_OPS: &[&str] = &[
    "status", "log", "diff", "add", "commit", "push", "pull", "clone", "init", "branch",
    "checkout", "fetch", "stash",
];

/// Build the exact argv for a git invocation.
pub fn build_git_argv(op: &str, path: &str, extra_args: &str) -> Vec<String> {
    let mut argv = vec![
        "git".to_string(),
        "-C".to_string(),
        path.to_string(),
        op.to_string(),
    ];
    argv.extend(
        extra_args
            .split(' ')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
    );
    argv
}

/// Run an allowlisted git operation inside the workspace.
pub struct GitTool {
    policy: Arc<SecurityPolicy>,
    audit: Arc<AuditLog>,
}

impl GitTool {
    pub fn new(policy: Arc<SecurityPolicy>, audit: Arc<AuditLog>) -> Self {
        Self { policy, audit }
    }
}

#[async_trait]
impl Tool for GitTool {
    fn name(&self) -> &str {
        "git_operations"
    }

    fn description(&self) -> &str {
        "Run a git operation (status, log, diff, add, commit, ...) in a workspace repository"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let op = match require_str(&args, "op", "git_operations") {
            Ok(o) => o,
            Err(result) => return Ok(result),
        };
        let path = optional_str(&args, "path", ".");
        let extra = optional_str(&args, "args", "");

        self.audit
            .append("git_operations", &format!("{} {}", op, path));

        if !ALLOWED_OPS.contains(&op) {
            return Ok(ToolResult::failure(format!(
                "git_operations: unsupported op '{}'",
                op
            )));
        }
        if !self.policy.allow_path(path) {
            return Ok(ToolResult::failure(
                "git_operations: path outside workspace is not allowed",
            ));
        }

        let argv = build_git_argv(op, path, extra);
        let output = Command::new(&argv[0])
            .args(&argv[1..])
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
