//! Configuration schema for `~/.bareclaw/config.toml`.
//!
//! The config file is a flat TOML document: string keys, no sections.
//! Environment variables override file values where noted.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Provider used first: anthropic, openai, openai-compatible, ollama,
    /// openrouter, or echo.
    pub default_provider: String,
    /// Model identifier passed to the provider.
    pub default_model: String,
    /// Memory backend. `markdown` is the only supported value at present.
    pub memory_backend: String,
    /// Comma-separated provider names tried after `default_provider` fails.
    pub fallback_providers: String,
    /// API key for the default provider. Environment variables win over this.
    pub api_key: String,
    /// Discord bot token (`DISCORD_BOT_TOKEN` overrides).
    pub discord_token: String,
    /// Discord webhook URL for outbound-only delivery.
    pub discord_webhook: String,
    /// Telegram bot token (`TELEGRAM_BOT_TOKEN` overrides).
    pub telegram_token: String,
    /// Capability servers, pipe-separated: `name=cmd arg1 arg2|name2=cmd2`.
    pub mcp_servers: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: "echo".to_string(),
            default_model: "claude-sonnet-4-5".to_string(),
            memory_backend: "markdown".to_string(),
            fallback_providers: String::new(),
            api_key: String::new(),
            discord_token: String::new(),
            discord_webhook: String::new(),
            telegram_token: String::new(),
            mcp_servers: String::new(),
        }
    }
}

/// One configured capability server: a display name and the argv to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerSpec {
    pub name: String,
    pub argv: Vec<String>,
}

impl Config {
    /// Telegram token with the environment override applied.
    pub fn effective_telegram_token(&self) -> String {
        std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_else(|_| self.telegram_token.clone())
    }

    /// Discord token with the environment override applied.
    pub fn effective_discord_token(&self) -> String {
        std::env::var("DISCORD_BOT_TOKEN").unwrap_or_else(|_| self.discord_token.clone())
    }

    /// Parse the `mcp_servers` value into server specs.
    ///
    /// Entries are pipe-separated; each entry is `name=cmd arg1 arg2`.
    /// Malformed entries (no `=`, empty name or command) are skipped.
    pub fn mcp_server_specs(&self) -> Vec<McpServerSpec> {
        parse_mcp_servers(&self.mcp_servers)
    }

    /// Fallback provider names, split on commas, empties removed.
    pub fn fallback_provider_names(&self) -> Vec<String> {
        self.fallback_providers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Set a config value by its file key. Errors on unrecognised keys.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "default_provider" => self.default_provider = value.to_string(),
            "default_model" => self.default_model = value.to_string(),
            "memory_backend" => self.memory_backend = value.to_string(),
            "fallback_providers" => self.fallback_providers = value.to_string(),
            "api_key" => self.api_key = value.to_string(),
            "discord_token" => self.discord_token = value.to_string(),
            "discord_webhook" => self.discord_webhook = value.to_string(),
            "telegram_token" => self.telegram_token = value.to_string(),
            "mcp_servers" => self.mcp_servers = value.to_string(),
            other => return Err(format!("unknown config key '{}'", other)),
        }
        Ok(())
    }

    /// Render all values for display, masking secrets.
    pub fn display_masked(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("default_provider = \"{}\"", self.default_provider));
        lines.push(format!("default_model = \"{}\"", self.default_model));
        lines.push(format!("memory_backend = \"{}\"", self.memory_backend));
        lines.push(format!(
            "fallback_providers = \"{}\"",
            self.fallback_providers
        ));
        lines.push(format!("api_key = \"{}\"", mask_secret(&self.api_key)));
        lines.push(format!(
            "discord_token = \"{}\"",
            mask_secret(&self.discord_token)
        ));
        lines.push(format!("discord_webhook = \"{}\"", self.discord_webhook));
        lines.push(format!(
            "telegram_token = \"{}\"",
            mask_secret(&self.telegram_token)
        ));
        lines.push(format!("mcp_servers = \"{}\"", self.mcp_servers));
        lines.join("\n")
    }
}

/// Mask a secret for display: first four characters then an ellipsis.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let prefix: String = value.chars().take(4).collect();
    format!("{}…", prefix)
}

/// Parse a pipe-separated `name=cmd arg…` list into server specs.
pub fn parse_mcp_servers(raw: &str) -> Vec<McpServerSpec> {
    raw.split('|')
        .filter_map(|entry| {
            let entry = entry.trim();
            let (name, cmdline) = entry.split_once('=')?;
            let name = name.trim();
            let argv: Vec<String> = cmdline
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();
            if name.is_empty() || argv.is_empty() {
                return None;
            }
            Some(McpServerSpec {
                name: name.to_string(),
                argv,
            })
        })
        .collect()
}
