//! Runtime introspection tools: agent status and audit log tail.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::base::{Tool, ToolResult};
use crate::agent::audit::AuditLog;
use crate::agent::memory::MemoryStore;
use crate::agent::policy::SecurityPolicy;

/// Report workspace, memory, and policy state.
pub struct AgentStatusTool {
    policy: Arc<SecurityPolicy>,
    memory: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl AgentStatusTool {
    pub fn new(
        policy: Arc<SecurityPolicy>,
        memory: Arc<MemoryStore>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            policy,
            memory,
            audit,
        }
    }
}

#[async_trait]
impl Tool for AgentStatusTool {
    fn name(&self) -> &str {
        "agent_status"
    }

    fn description(&self) -> &str {
        "Show the agent's workspace, memory entry count, and security policy"
    }

    async fn execute(
        &self,
        _args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        self.audit.append("agent_status", "");
        Ok(ToolResult::success(format!(
            "workspace: {}\nmemory entries: {}\npolicy: {}",
            self.policy.workspace_dir().display(),
            self.memory.entry_count(),
            self.policy.summary()
        )))
    }
}

/// Return the most recent audit log lines.
pub struct AuditLogReadTool {
    audit: Arc<AuditLog>,
}

impl AuditLogReadTool {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl Tool for AuditLogReadTool {
    fn name(&self) -> &str {
        "audit_log_read"
    }

    fn description(&self) -> &str {
        "Read the last entries of the tool audit log"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let n = args
            .get("n")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(50);
        self.audit.append("audit_log_read", &n.to_string());
        Ok(ToolResult::success(self.audit.read_last(n)))
    }
}
