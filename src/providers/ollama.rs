//! Ollama provider (local, keyless).

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use super::base::ChatProvider;
use crate::errors::ProviderError;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Provider speaking the Ollama `/api/chat` format. No auth header and no
/// temperature field — Ollama applies its own model defaults.
pub struct OllamaProvider {
    api_base: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(api_base: Option<&str>) -> Self {
        Self {
            api_base: api_base
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        model: &str,
        _temperature: f64,
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.api_base);
        let body = json!({
            "model": model,
            "stream": false,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::ResponseRead(e.to_string()))?;

        if !status.is_success() {
            warn!("ollama returned HTTP {} ({})", status, self.api_base);
            return Ok(format!("HTTP {}: {}", status.as_u16(), text));
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::JsonParse(e.to_string()))?;
        data.get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::JsonParse("missing message.content".to_string()).into())
    }
}
