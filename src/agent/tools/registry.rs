//! Tool registry: ordered name → tool lookup and the system-prompt manifest.

use super::base::Tool;

/// Registry of agent tools.
///
/// Registration order is preserved; lookup is a linear scan where the
/// first match wins, and the manifest lists tools in registration order
/// so the system prompt is deterministic.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool at the end of the lookup order.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Look up a tool by name. First match wins.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// The `- name: description` manifest injected into the system prompt.
    pub fn manifest(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tools::base::ToolResult;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeTool {
        name: &'static str,
        desc: &'static str,
    }

    #[async_trait]
    impl Tool for FakeTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            self.desc
        }
        async fn execute(
            &self,
            _args: HashMap<String, serde_json::Value>,
        ) -> anyhow::Result<ToolResult> {
            Ok(ToolResult::success(self.name))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut reg = ToolRegistry::new();
        reg.register(Box::new(FakeTool {
            name: "alpha",
            desc: "first",
        }));
        assert!(reg.get("alpha").is_some());
        assert!(reg.get("beta").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_first_match_wins() {
        let mut reg = ToolRegistry::new();
        reg.register(Box::new(FakeTool {
            name: "dup",
            desc: "first registration",
        }));
        reg.register(Box::new(FakeTool {
            name: "dup",
            desc: "second registration",
        }));
        assert_eq!(reg.get("dup").unwrap().description(), "first registration");
    }

    #[test]
    fn test_manifest_preserves_order() {
        let mut reg = ToolRegistry::new();
        reg.register(Box::new(FakeTool {
            name: "shell",
            desc: "Run a command",
        }));
        reg.register(Box::new(FakeTool {
            name: "file_read",
            desc: "Read a file",
        }));
        assert_eq!(
            reg.manifest(),
            "- shell: Run a command\n- file_read: Read a file"
        );
    }

    #[test]
    fn test_empty_registry() {
        let reg = ToolRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.manifest(), "");
    }
}
