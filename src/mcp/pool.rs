//! Pool of persistent capability-server sessions, keyed by argv.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::McpError;
use crate::mcp::session::McpSession;

/// Pool key: the argv joined with single spaces.
pub fn pool_key(argv: &[String]) -> String {
    argv.join(" ")
}

/// Owns all pool sessions; one session per distinct argv.
///
/// Calls are serialised through the pool lock, so a session is never used
/// by two callers at once.
#[derive(Default)]
pub struct McpSessionPool {
    sessions: Mutex<HashMap<String, McpSession>>,
}

impl McpSessionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call a remote tool, starting the session on first use of its argv.
    pub async fn call_tool(
        &self,
        argv: &[String],
        tool: &str,
        arguments: &Value,
    ) -> Result<String, McpError> {
        let key = pool_key(argv);
        let mut sessions = self.sessions.lock().await;

        if !sessions.contains_key(&key) {
            info!("starting capability server: {}", key);
            let session = McpSession::start(argv, None).await?;
            sessions.insert(key.clone(), session);
        }
        let session = sessions
            .get_mut(&key)
            .ok_or_else(|| McpError::Protocol("session missing from pool".to_string()))?;
        session.call_tool(tool, arguments).await
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Tear down every session: close stdin, await child exit.
    pub async fn shutdown(&self) {
        let mut sessions = self.sessions.lock().await;
        for (key, session) in sessions.drain() {
            info!("stopping capability server: {}", key);
            session.shutdown().await;
        }
    }
}
