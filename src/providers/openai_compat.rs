//! OpenAI-style chat completions provider.
//!
//! Covers OpenAI itself, OpenRouter, and any self-hosted endpoint that
//! implements the chat completions API format.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use super::base::ChatProvider;
use crate::errors::ProviderError;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Referer/title headers OpenRouter uses for app attribution.
const OPENROUTER_REFERER: &str = "https://github.com/bareclaw/bareclaw";
const OPENROUTER_TITLE: &str = "BareClaw";

/// Provider speaking the OpenAI chat completions format.
pub struct OpenAICompatProvider {
    label: &'static str,
    api_key: String,
    api_base: String,
    openrouter_headers: bool,
    client: Client,
}

impl OpenAICompatProvider {
    /// Direct OpenAI API.
    pub fn openai(api_key: &str) -> Self {
        Self {
            label: "openai",
            api_key: api_key.to_string(),
            api_base: OPENAI_API_BASE.to_string(),
            openrouter_headers: false,
            client: Client::new(),
        }
    }

    /// Any OpenAI-compatible endpoint at an explicit base URL.
    pub fn compatible(api_key: &str, api_base: &str) -> Self {
        Self {
            label: "openai-compatible",
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            openrouter_headers: false,
            client: Client::new(),
        }
    }

    /// OpenRouter, which adds attribution headers.
    pub fn openrouter(api_key: &str) -> Self {
        Self {
            label: "openrouter",
            api_key: api_key.to_string(),
            api_base: OPENROUTER_API_BASE.to_string(),
            openrouter_headers: true,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAICompatProvider {
    fn name(&self) -> &str {
        self.label
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = json!({
            "model": model,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if self.openrouter_headers {
            request = request
                .header("HTTP-Referer", OPENROUTER_REFERER)
                .header("X-Title", OPENROUTER_TITLE);
        }

        let response = request
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
            warn!("{} returned HTTP {} ({})", self.label, status, self.api_base);
            return Ok(format!("HTTP {}: {}", status.as_u16(), text));
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::JsonParse(e.to_string()))?;
        extract_content(&data).map_err(Into::into)
    }
}

/// Pull `choices[0].message.content` out of a chat completions response.
pub(crate) fn extract_content(data: &Value) -> Result<String, ProviderError> {
    data.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ProviderError::JsonParse("missing choices[0].message.content".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_ok() {
        let data = json!({
            "choices": [{"message": {"role": "assistant", "content": "hi there"}}]
        });
        assert_eq!(extract_content(&data).unwrap(), "hi there");
    }

    #[test]
    fn test_extract_content_missing() {
        let data = json!({"choices": []});
        assert!(extract_content(&data).is_err());
        let data = json!({"error": {"message": "bad request"}});
        assert!(extract_content(&data).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = OpenAICompatProvider::compatible("k", "http://localhost:8000/v1/");
        assert_eq!(p.api_base, "http://localhost:8000/v1");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        // Nothing listens on discard; the router needs a real Err here.
        let p = OpenAICompatProvider::compatible("k", "http://127.0.0.1:9");
        let err = p.chat("s", "u", "m", 0.7).await.unwrap_err();
        assert!(err.downcast_ref::<ProviderError>().is_some());
    }
}
