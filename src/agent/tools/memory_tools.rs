//! Tools exposing the persistent key/value memory to the model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::base::{optional_str, require_str, Tool, ToolResult};
use crate::agent::audit::AuditLog;
use crate::agent::memory::MemoryStore;

/// Store a memory entry under a key.
pub struct MemoryStoreTool {
    memory: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl MemoryStoreTool {
    pub fn new(memory: Arc<MemoryStore>, audit: Arc<AuditLog>) -> Self {
        Self { memory, audit }
    }
}

#[async_trait]
impl Tool for MemoryStoreTool {
    fn name(&self) -> &str {
        "memory_store"
    }

    fn description(&self) -> &str {
        "Store a note in persistent memory under a key"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let key = optional_str(&args, "key", "default");
        let content = optional_str(&args, "content", "");
        self.audit.append("memory_store", key);
        self.memory.store(key, content)?;
        Ok(ToolResult::success(format!("stored memory under '{}'", key)))
    }
}

/// Recall a memory entry by key or substring.
pub struct MemoryRecallTool {
    memory: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl MemoryRecallTool {
    pub fn new(memory: Arc<MemoryStore>, audit: Arc<AuditLog>) -> Self {
        Self { memory, audit }
    }
}

#[async_trait]
impl Tool for MemoryRecallTool {
    fn name(&self) -> &str {
        "memory_recall"
    }

    fn description(&self) -> &str {
        "Recall notes from persistent memory by key or substring"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let key = match require_str(&args, "key", "memory_recall") {
            Ok(k) => k,
            Err(result) => return Ok(result),
        };
        self.audit.append("memory_recall", key);
        Ok(ToolResult::success(self.memory.recall(key)))
    }
}

/// Delete a memory entry. Deleting a missing key succeeds.
pub struct MemoryForgetTool {
    memory: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl MemoryForgetTool {
    pub fn new(memory: Arc<MemoryStore>, audit: Arc<AuditLog>) -> Self {
        Self { memory, audit }
    }
}

#[async_trait]
impl Tool for MemoryForgetTool {
    fn name(&self) -> &str {
        "memory_forget"
    }

    fn description(&self) -> &str {
        "Delete a note from persistent memory"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let key = match require_str(&args, "key", "memory_forget") {
            Ok(k) => k,
            Err(result) => return Ok(result),
        };
        self.audit.append("memory_forget", key);
        self.memory.forget(key)?;
        Ok(ToolResult::success(format!("forgot '{}'", key)))
    }
}

/// List all memory keys.
pub struct MemoryListKeysTool {
    memory: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl MemoryListKeysTool {
    pub fn new(memory: Arc<MemoryStore>, audit: Arc<AuditLog>) -> Self {
        Self { memory, audit }
    }
}

#[async_trait]
impl Tool for MemoryListKeysTool {
    fn name(&self) -> &str {
        "memory_list_keys"
    }

    fn description(&self) -> &str {
        "List all keys in persistent memory"
    }

    async fn execute(
        &self,
        _args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        self.audit.append("memory_list_keys", "");
        Ok(ToolResult::success(self.memory.list_keys()))
    }
}

/// Delete every memory entry whose key starts with a prefix.
pub struct MemoryDeletePrefixTool {
    memory: Arc<MemoryStore>,
    audit: Arc<AuditLog>,
}

impl MemoryDeletePrefixTool {
    pub fn new(memory: Arc<MemoryStore>, audit: Arc<AuditLog>) -> Self {
        Self { memory, audit }
    }
}

#[async_trait]
impl Tool for MemoryDeletePrefixTool {
    fn name(&self) -> &str {
        "memory_delete_prefix"
    }

    fn description(&self) -> &str {
        "Delete all memory entries whose key starts with a prefix"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let prefix = match require_str(&args, "prefix", "memory_delete_prefix") {
            Ok(p) => p,
            Err(result) => return Ok(result),
        };
        self.audit.append("memory_delete_prefix", prefix);
        let removed = self.memory.delete_prefix(prefix);
        Ok(ToolResult::success(format!(
            "deleted {} memory entries",
            removed
        )))
    }
}
