//! Native Anthropic Messages API provider.
//!
//! Speaks `POST /v1/messages` directly and translates the response's
//! content-block format into the internal OpenAI-style representation:
//! text blocks are newline-joined, and `tool_use` blocks become a
//! `{"tool_calls": […]}` JSON string. That translation is what keeps the
//! agent loop provider-agnostic.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use super::base::ChatProvider;
use crate::errors::ProviderError;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `max_tokens` is required by the Messages API.
const DEFAULT_MAX_TOKENS: u32 = 8096;

/// Provider for the Anthropic Messages API.
pub struct AnthropicProvider {
    api_key: String,
    api_base: String,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: ANTHROPIC_API_BASE.to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String> {
        let url = format!("{}/v1/messages", self.api_base);
        let body = json!({
            "model": model,
            "max_tokens": DEFAULT_MAX_TOKENS,
            "temperature": temperature,
            "system": system,
            "messages": [
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
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
            warn!("anthropic returned HTTP {}", status);
            return Ok(format!("HTTP {}: {}", status.as_u16(), text));
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::JsonParse(e.to_string()))?;
        let blocks = data
            .get("content")
            .and_then(|c| c.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(translate_content_blocks(&blocks))
    }
}

/// Translate Anthropic content blocks to the internal representation.
///
/// When any `tool_use` block is present, the whole response becomes the
/// OpenAI-style tool-call JSON (with each block's `input` serialized into
/// the `arguments` string); otherwise the text blocks are newline-joined.
pub(crate) fn translate_content_blocks(blocks: &[Value]) -> String {
    let mut texts: Vec<&str> = Vec::new();
    let mut tool_calls: Vec<Value> = Vec::new();

    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                    texts.push(text);
                }
            }
            Some("tool_use") => {
                let name = block.get("name").and_then(|n| n.as_str()).unwrap_or("");
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                let arguments =
                    serde_json::to_string(&input).unwrap_or_else(|_| "{}".to_string());
                tool_calls.push(json!({
                    "function": {"name": name, "arguments": arguments},
                }));
            }
            _ => {}
        }
    }

    if !tool_calls.is_empty() {
        return json!({"tool_calls": tool_calls}).to_string();
    }
    texts.join("\n")
}
