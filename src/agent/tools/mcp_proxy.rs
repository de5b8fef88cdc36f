//! Proxied tools published by external capability servers.
//!
//! Each discovered remote tool is registered as `<server>__<tool>`; a call
//! forwards the arguments over the server's pooled stdio session.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::base::{Tool, ToolResult};
use crate::agent::audit::AuditLog;
use crate::mcp::pool::McpSessionPool;

/// A tool that forwards calls to a capability server.
pub struct McpProxyTool {
    name: String,
    description: String,
    remote_name: String,
    argv: Vec<String>,
    pool: Arc<McpSessionPool>,
    audit: Arc<AuditLog>,
}

impl McpProxyTool {
    pub fn new(
        server_name: &str,
        remote_name: &str,
        description: &str,
        argv: Vec<String>,
        pool: Arc<McpSessionPool>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            name: format!("{}__{}", server_name, remote_name),
            description: description.to_string(),
            remote_name: remote_name.to_string(),
            argv,
            pool,
            audit,
        }
    }
}

#[async_trait]
impl Tool for McpProxyTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        self.audit.append("mcp_tool", &self.remote_name);
        let arguments = Value::Object(args.into_iter().collect());
        let output = self
            .pool
            .call_tool(&self.argv, &self.remote_name, &arguments)
            .await?;
        Ok(ToolResult::success(output))
    }
}
