//! Discord channel: gateway WebSocket for receiving, REST for replies.
//!
//! Implements the minimal gateway client lifecycle — hello, identify,
//! heartbeat, dispatch — and answers `MESSAGE_CREATE` events with one
//! agent turn each.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use crate::agent::agent_loop::Agent;
use crate::channels::base::Channel;

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
const API_BASE: &str = "https://discord.com/api/v10";

/// GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT.
const INTENTS: u64 = (1 << 9) | (1 << 12) | (1 << 15);

/// Reconnect delay after the gateway drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Discord channel driven by the gateway.
pub struct DiscordChannel {
    token: String,
    agent: Arc<Agent>,
    client: reqwest::Client,
    bot_user_id: String,
}

impl DiscordChannel {
    pub fn new(token: String, agent: Arc<Agent>) -> Self {
        Self {
            token,
            agent,
            client: reqwest::Client::new(),
            bot_user_id: String::new(),
        }
    }

    /// One gateway session: returns Ok on orderly close, Err to reconnect.
    async fn run_session(&mut self) -> Result<()> {
        let (ws, _) = tokio_tungstenite::connect_async(GATEWAY_URL).await?;
        let (mut writer, mut reader) = ws.split();

        // First frame must be HELLO with the heartbeat interval.
        let hello = match reader.next().await {
            Some(Ok(WsMessage::Text(text))) => serde_json::from_str::<Value>(&text)?,
            other => return Err(anyhow!("expected gateway hello, got {:?}", other)),
        };
        let heartbeat_ms = hello
            .get("d")
            .and_then(|d| d.get("heartbeat_interval"))
            .and_then(|h| h.as_u64())
            .ok_or_else(|| anyhow!("gateway hello missing heartbeat_interval"))?;

        writer
            .send(WsMessage::Text(
                json!({
                    "op": 2,
                    "d": {
                        "token": self.token,
                        "intents": INTENTS,
                        "properties": {"os": "linux", "browser": "bareclaw", "device": "bareclaw"},
                    },
                })
                .to_string(),
            ))
            .await?;

        let mut heartbeat = tokio::time::interval(Duration::from_millis(heartbeat_ms));
        let mut last_seq: Option<i64> = None;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    writer
                        .send(WsMessage::Text(json!({"op": 1, "d": last_seq}).to_string()))
                        .await?;
                }
                frame = reader.next() => {
                    let frame = match frame {
                        Some(Ok(WsMessage::Text(text))) => text,
                        Some(Ok(WsMessage::Close(_))) | None => {
                            return Err(anyhow!("gateway closed"));
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                    };
                    let event: Value = match serde_json::from_str(&frame) {
                        Ok(v) => v,
                        Err(e) => {
                            debug!("unparseable gateway frame: {}", e);
                            continue;
                        }
                    };
                    if let Some(s) = event.get("s").and_then(|s| s.as_i64()) {
                        last_seq = Some(s);
                    }
                    self.handle_event(&event).await;
                }
            }
        }
    }

    async fn handle_event(&mut self, event: &Value) {
        match event.get("t").and_then(|t| t.as_str()) {
            Some("READY") => {
                self.bot_user_id = event["d"]["user"]["id"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                info!("discord gateway ready (bot id {})", self.bot_user_id);
            }
            Some("MESSAGE_CREATE") => {
                let data = &event["d"];
                let author_id = data["author"]["id"].as_str().unwrap_or_default();
                let author_is_bot = data["author"]["bot"].as_bool().unwrap_or(false);
                // Never answer ourselves or other bots.
                if author_is_bot || author_id == self.bot_user_id {
                    return;
                }
                let Some(content) = data["content"].as_str().filter(|c| !c.is_empty()) else {
                    return;
                };
                let Some(channel_id) = data["channel_id"].as_str() else {
                    return;
                };

                debug!("discord message in channel {}", channel_id);
                let reply = match self.agent.run_once(content).await {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("agent turn failed: {}", e);
                        format!("(agent error: {})", e)
                    }
                };
                if let Err(e) = self.send_reply(channel_id, &reply).await {
                    warn!("discord send failed: {}", e);
                }
            }
            _ => {}
        }
    }

    async fn send_reply(&self, channel_id: &str, content: &str) -> Result<()> {
        self.client
            .post(format!("{}/channels/{}/messages", API_BASE, channel_id))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&json!({"content": content}))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn run(&mut self) -> Result<()> {
        info!("discord channel started (gateway)");
        loop {
            if let Err(e) = self.run_session().await {
                warn!("discord gateway session ended: {}, reconnecting", e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
