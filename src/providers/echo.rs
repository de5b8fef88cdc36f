//! Echo provider: the explicit no-network fallback.

use anyhow::Result;
use async_trait::async_trait;

use super::base::ChatProvider;

/// Returns the user message back. Activated explicitly, or implicitly
/// when a keyed backend has no credentials.
#[derive(Default)]
pub struct EchoProvider;

impl EchoProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn chat(
        &self,
        _system: &str,
        user: &str,
        _model: &str,
        _temperature: f64,
    ) -> Result<String> {
        Ok(format!("BareClaw echo (no API key configured): {}", user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_reflects_user_message() {
        let provider = EchoProvider::new();
        let reply = provider.chat("sys", "hello world", "any", 0.7).await.unwrap();
        assert_eq!(reply, "BareClaw echo (no API key configured): hello world");
    }
}
