//! Telegram channel using the Bot API directly via reqwest.
//!
//! Uses long polling (`getUpdates`) so no public IP or webhook is needed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::agent::agent_loop::Agent;
use crate::channels::base::Channel;

/// Long-poll timeout passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u64 = 50;
/// Back-off after a transport error before polling again.
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Telegram channel: one agent turn per incoming message.
pub struct TelegramChannel {
    token: String,
    agent: Arc<Agent>,
    client: reqwest::Client,
    offset: i64,
}

impl TelegramChannel {
    pub fn new(token: String, agent: Arc<Agent>) -> Self {
        Self {
            token,
            agent,
            client: reqwest::Client::new(),
            offset: 0,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    async fn poll_updates(&self) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&[
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
                ("offset", self.offset.to_string()),
            ])
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .send()
            .await?;
        let data: Value = response.json().await?;
        Ok(data
            .get("result")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default())
    }

    async fn handle_update(&self, update: &Value) {
        let Some(message) = update.get("message") else {
            return;
        };
        // Identity filtering: never respond to bots, ourselves included.
        if message
            .get("from")
            .and_then(|f| f.get("is_bot"))
            .and_then(|b| b.as_bool())
            .unwrap_or(false)
        {
            return;
        }
        let Some(chat_id) = message
            .get("chat")
            .and_then(|c| c.get("id"))
            .and_then(|id| id.as_i64())
        else {
            return;
        };
        let Some(text) = message.get("text").and_then(|t| t.as_str()) else {
            return;
        };

        debug!("telegram message in chat {}", chat_id);
        let reply = match self.agent.run_once(text).await {
            Ok(r) => r,
            Err(e) => {
                warn!("agent turn failed: {}", e);
                format!("(agent error: {})", e)
            }
        };
        if let Err(e) = self.send_message(chat_id, &reply).await {
            warn!("telegram send failed: {}", e);
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.client
            .post(self.api_url("sendMessage"))
            .json(&json!({"chat_id": chat_id, "text": text}))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn run(&mut self) -> Result<()> {
        info!("telegram channel started (long poll)");
        loop {
            let updates = match self.poll_updates().await {
                Ok(u) => u,
                Err(e) => {
                    warn!("telegram poll failed: {}", e);
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };
            for update in &updates {
                if let Some(update_id) = update.get("update_id").and_then(|id| id.as_i64()) {
                    self.offset = self.offset.max(update_id + 1);
                }
                self.handle_update(update).await;
            }
        }
    }
}
