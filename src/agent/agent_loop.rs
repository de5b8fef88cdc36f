//! The bounded tool-calling agent loop.
//!
//! Mediates between the provider and the tool registry for up to
//! [`MAX_TOOL_ROUNDS`] rounds, feeding tool results back through the
//! context buffer until the model answers in plain text.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::agent::context::{clamp_context_limit, clamp_tool_output_limit, ContextBuffer};
use crate::agent::context::{MAX_CONTEXT_CHARS, MAX_TOOL_OUTPUT_CHARS};
use crate::agent::dispatch::dispatch;
use crate::agent::memory::MemoryStore;
use crate::agent::tools::registry::ToolRegistry;
use crate::providers::base::ChatProvider;

/// Maximum model/tool rounds per agent turn.
pub const MAX_TOOL_ROUNDS: usize = 8;

/// Sampling temperature for agent turns.
const TEMPERATURE: f64 = 0.7;

/// Per-agent settings.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub max_context_chars: usize,
    pub max_tool_output_chars: usize,
}

impl AgentSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_context_chars: MAX_CONTEXT_CHARS,
            max_tool_output_chars: MAX_TOOL_OUTPUT_CHARS,
        }
    }

    /// Apply the supported ranges to configured limits.
    pub fn clamped(mut self) -> Self {
        self.max_context_chars = clamp_context_limit(self.max_context_chars);
        self.max_tool_output_chars = clamp_tool_output_limit(self.max_tool_output_chars);
        self
    }
}

/// One agent: a provider, a tool registry, and persistent memory.
pub struct Agent {
    provider: Arc<dyn ChatProvider>,
    registry: Arc<ToolRegistry>,
    memory: Arc<MemoryStore>,
    settings: AgentSettings,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        registry: Arc<ToolRegistry>,
        memory: Arc<MemoryStore>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            provider,
            registry,
            memory,
            settings: settings.clamped(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Build the system prompt: fixed preamble plus the tool manifest when
    /// the registry is non-empty.
    fn build_system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are BareClaw, a capable personal agent running on the user's own machine. \
             Be concise and direct. Use tools when they help you answer accurately.",
        );
        if !self.registry.is_empty() {
            prompt.push_str("\n\n## Tools\nYou can call these tools:\n");
            prompt.push_str(&self.registry.manifest());
            prompt.push_str(
                "\n\nTo call tools, reply with ONLY a JSON object shaped like:\n\
                 {\"tool_calls\":[{\"function\":{\"name\":\"<tool>\",\"arguments\":\"{\\\"key\\\":\\\"value\\\"}\"}}]}\n\
                 After you receive tool results, answer the user in plain text with no JSON.",
            );
        }
        prompt
    }

    /// Run one bounded agent turn and return the final reply text.
    pub async fn run_once(&self, user_message: &str) -> Result<String> {
        let system = self.build_system_prompt();
        let mut buffer = ContextBuffer::new(self.settings.max_context_chars);

        for round in 0..MAX_TOOL_ROUNDS {
            let effective = if round == 0 {
                user_message.to_string()
            } else {
                format!(
                    "{}\n\n[Tool results]\n{}\n[Instructions] You already have the tool results \
                     above. Respond to the user in plain friendly text. Do NOT output any JSON \
                     or tool_calls.",
                    user_message,
                    buffer.as_str()
                )
            };

            let response = self
                .provider
                .chat(&system, &effective, &self.settings.model, TEMPERATURE)
                .await?;

            let dispatched = dispatch(
                &response,
                &self.registry,
                &mut buffer,
                self.settings.max_tool_output_chars,
            )
            .await;

            if !dispatched {
                debug!("agent turn finished after {} round(s)", round + 1);
                if let Err(e) = self.memory.store("last_message", user_message) {
                    warn!("failed to persist last_message: {}", e);
                }
                return Ok(response);
            }
        }

        Ok("(agent reached max tool-call rounds)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::audit::AuditLog;
    use crate::agent::tools::memory_tools::MemoryStoreTool;
    use crate::providers::echo::EchoProvider;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Provider that replays a fixed script of responses.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }
        async fn chat(
            &self,
            _system: &str,
            _user: &str,
            _model: &str,
            _temperature: f64,
        ) -> Result<String> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| "(script exhausted)".to_string()))
        }
    }

    fn make_agent(provider: Arc<dyn ChatProvider>) -> (TempDir, Agent, Arc<MemoryStore>) {
        let tmp = TempDir::new().unwrap();
        let memory = Arc::new(MemoryStore::new(tmp.path()));
        let audit = Arc::new(AuditLog::new(tmp.path()));

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(MemoryStoreTool::new(memory.clone(), audit)));

        let agent = Agent::new(
            provider,
            Arc::new(registry),
            memory.clone(),
            AgentSettings::new("test-model"),
        );
        (tmp, agent, memory)
    }

    #[tokio::test]
    async fn test_plain_answer_returned_directly() {
        let provider = Arc::new(ScriptedProvider::new(vec!["Just a plain answer."]));
        let (_tmp, agent, memory) = make_agent(provider);

        let reply = agent.run_once("hello there").await.unwrap();
        assert_eq!(reply, "Just a plain answer.");
        // The user message is persisted when the turn completes.
        assert_eq!(memory.recall("last_message"), "hello there\n");
    }

    #[tokio::test]
    async fn test_tool_round_then_final_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            r#"{"tool_calls":[{"function":"memory_store","arguments":{"key":"fact","content":"42"}}]}"#,
            "Stored it for you.",
        ]));
        let (_tmp, agent, memory) = make_agent(provider);

        let reply = agent.run_once("remember 42").await.unwrap();
        assert_eq!(reply, "Stored it for you.");
        assert_eq!(memory.recall("fact"), "42\n");
    }

    #[tokio::test]
    async fn test_exhaustion_after_max_rounds() {
        let call = r#"{"tool_calls":[{"function":"memory_store","arguments":{"key":"k","content":"v"}}]}"#;
        let provider = Arc::new(ScriptedProvider::new(vec![call; MAX_TOOL_ROUNDS + 2]));
        let (_tmp, agent, _memory) = make_agent(provider);

        let reply = agent.run_once("loop forever").await.unwrap();
        assert_eq!(reply, "(agent reached max tool-call rounds)");
    }

    #[tokio::test]
    async fn test_system_prompt_lists_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec!["ok"]));
        let (_tmp, agent, _memory) = make_agent(provider);
        let prompt = agent.build_system_prompt();
        assert!(prompt.contains("- memory_store:"));
        assert!(prompt.contains("tool_calls"));
    }

    #[tokio::test]
    async fn test_empty_registry_omits_manifest() {
        let tmp = TempDir::new().unwrap();
        let memory = Arc::new(MemoryStore::new(tmp.path()));
        let agent = Agent::new(
            Arc::new(EchoProvider::new()),
            Arc::new(ToolRegistry::new()),
            memory,
            AgentSettings::new("m"),
        );
        let prompt = agent.build_system_prompt();
        assert!(!prompt.contains("## Tools"));
    }

    #[test]
    fn test_settings_clamped() {
        let s = AgentSettings {
            model: "m".into(),
            max_context_chars: 1,
            max_tool_output_chars: 1_000_000,
        }
        .clamped();
        assert_eq!(s.max_context_chars, 4000);
        assert_eq!(s.max_tool_output_chars, 32_000);
    }
}
