//! Base LLM provider interface.

use anyhow::Result;
use async_trait::async_trait;

/// Abstract chat interface over incompatible provider wire formats.
///
/// The contract is deliberately narrow: one system prompt, one user
/// message, plain text out. Backends that emit structured tool calls
/// (Anthropic `tool_use` blocks) translate them into the internal
/// OpenAI-style `tool_calls` JSON before returning, which keeps the agent
/// loop provider-agnostic.
///
/// Error discipline: transport failures are `Err` (the router falls
/// through to the next provider); HTTP-level failures come back as a
/// synthetic `HTTP <code>: <body>` success string so the model can react
/// without crashing the loop.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short provider name for logging.
    fn name(&self) -> &str;

    /// Send one chat exchange and return the response text.
    async fn chat(&self, system: &str, user: &str, model: &str, temperature: f64)
        -> Result<String>;
}
