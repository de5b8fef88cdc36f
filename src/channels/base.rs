//! Base trait for chat channels.

use anyhow::Result;
use async_trait::async_trait;

/// Trait that every chat channel must implement.
///
/// A channel owns its transport: it receives user messages, runs one
/// agent turn per message, and routes the final reply back. Transports
/// are responsible for their own timeouts, reconnection, and identity
/// filtering (a channel must ignore the bot's own messages).
#[async_trait]
pub trait Channel: Send {
    /// Human-readable channel name (e.g. `"telegram"`).
    fn name(&self) -> &str;

    /// Run the channel until the transport fails unrecoverably.
    async fn run(&mut self) -> Result<()>;
}
