//! HTTP request tool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use super::base::{optional_str, require_str, Tool, ToolResult};
use crate::agent::audit::AuditLog;

/// Perform an HTTP GET or POST and return the response body.
pub struct HttpRequestTool {
    audit: Arc<AuditLog>,
    client: Client,
}

impl HttpRequestTool {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self {
            audit,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Tool for HttpRequestTool {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Make an HTTP GET or POST request and return the response body"
    }

    async fn execute(
        &self,
        args: HashMap<String, serde_json::Value>,
    ) -> anyhow::Result<ToolResult> {
        let url = match require_str(&args, "url", "http_request") {
            Ok(u) => u,
            Err(result) => return Ok(result),
        };
        let method = optional_str(&args, "method", "GET");
        let body = optional_str(&args, "body", "");

        self.audit.append("http_request", url);

        let parsed = match reqwest::Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                return Ok(ToolResult::failure(format!(
                    "http_request: invalid url {}: {}",
                    url, e
                )))
            }
        };

        let request = if method == "POST" {
            self.client.post(parsed).body(body.to_string())
        } else {
            self.client.get(parsed)
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                return Ok(ToolResult::failure(format!("http_request failed: {}", e)));
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            Ok(ToolResult::success(text))
        } else {
            Ok(ToolResult::failure(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )))
        }
    }
}
