//! File read/write tools scoped to the workspace.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;

use super::base::{require_str, Tool, ToolResult};
use crate::agent::audit::AuditLog;
use crate::agent::policy::SecurityPolicy;

/// Upper bound on bytes read from a single file.
const MAX_READ_BYTES: u64 = 4 * 1024 * 1024;

/// Read a file within the workspace.
pub struct FileReadTool {
    policy: Arc<SecurityPolicy>,
    audit: Arc<AuditLog>,
}

impl FileReadTool {
    pub fn new(policy: Arc<SecurityPolicy>, audit: Arc<AuditLog>) -> Self {
        Self { policy, audit }
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read a file from the workspace"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let path = match require_str(&args, "path", "file_read") {
            Ok(p) => p,
            Err(result) => return Ok(result),
        };

        self.audit.append("file_read", path);

        if !self.policy.allow_path(path) {
            return Ok(ToolResult::failure(
                "file_read: path outside workspace is not allowed",
            ));
        }

        let resolved = self.policy.resolve(path);
        let file = match fs::File::open(&resolved) {
            Ok(f) => f,
            Err(e) => {
                return Ok(ToolResult::failure(format!(
                    "file_read: cannot open {}: {}",
                    path, e
                )))
            }
        };

        let mut contents = Vec::new();
        file.take(MAX_READ_BYTES).read_to_end(&mut contents)?;
        Ok(ToolResult::success(
            String::from_utf8_lossy(&contents).to_string(),
        ))
    }
}

/// Write a file within the workspace, creating parent directories.
pub struct FileWriteTool {
    policy: Arc<SecurityPolicy>,
    audit: Arc<AuditLog>,
}

impl FileWriteTool {
    pub fn new(policy: Arc<SecurityPolicy>, audit: Arc<AuditLog>) -> Self {
        Self { policy, audit }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write content to a file in the workspace"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let path = match require_str(&args, "path", "file_write") {
            Ok(p) => p,
            Err(result) => return Ok(result),
        };
        let content = match require_str(&args, "content", "file_write") {
            Ok(c) => c,
            Err(result) => return Ok(result),
        };

        self.audit.append("file_write", path);

        if !self.policy.allow_path(path) {
            return Ok(ToolResult::failure(
                "file_write: path outside workspace is not allowed",
            ));
        }

        let resolved = self.policy.resolve(path);
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::write(&resolved, content) {
            Ok(()) => Ok(ToolResult::success(format!(
                "wrote {} bytes to {}",
                content.len(),
                path
            ))),
            Err(e) => Ok(ToolResult::failure(format!(
                "file_write: cannot write {}: {}",
                path, e
            ))),
        }
    }
}
