//! Domain error types for bareclaw.
//!
//! Typed errors at module boundaries replace string-encoded errors and
//! enable structured error handling via pattern matching.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Errors from LLM provider operations.
///
/// Embedded in `anyhow::Error` so the `ChatProvider` trait signature
/// (`-> anyhow::Result<String>`) stays unchanged while callers can
/// downcast: `e.downcast_ref::<ProviderError>()`.
///
/// Non-2xx HTTP responses are deliberately NOT errors: they come back as
/// a synthetic `HTTP <code>: <body>` success string so the model can see
/// and react to them. Only transport-level failures take this path, which
/// is what lets the fallback router move on to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    ResponseRead(String),

    #[error("failed to parse response JSON: {0}")]
    JsonParse(String),

    #[error("all providers failed, last error: {0}")]
    Exhausted(String),
}

// ---------------------------------------------------------------------------
// Capability proxy errors
// ---------------------------------------------------------------------------

/// Errors from the capability proxy (JSON-RPC over child stdio).
///
/// `Timeout` is only produced by probe sessions, which read with a
/// deadline so a hung server cannot stall startup. Pool sessions read
/// blocking and never time out.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("failed to spawn capability server: {0}")]
    Spawn(String),

    #[error("capability server closed its stdout")]
    ClosedPipe,

    #[error("write to capability server failed: {0}")]
    Write(String),

    #[error("timed out waiting for capability server response")]
    Timeout,

    #[error("malformed capability server response: {0}")]
    Protocol(String),
}

// ---------------------------------------------------------------------------
// Cron errors
// ---------------------------------------------------------------------------

/// Errors from cron expression parsing and task management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidExpression { expr: String, reason: String },

    #[error("no task with id '{0}'")]
    UnknownTask(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let e = ProviderError::Transport("connection refused".into());
        assert_eq!(e.to_string(), "HTTP request failed: connection refused");
    }

    #[test]
    fn test_provider_error_downcast() {
        let anyhow_err: anyhow::Error = ProviderError::JsonParse("bad json".into()).into();
        let downcasted = anyhow_err.downcast_ref::<ProviderError>();
        assert!(downcasted.is_some());
        assert!(matches!(
            downcasted.unwrap(),
            ProviderError::JsonParse(_)
        ));
    }

    #[test]
    fn test_mcp_timeout_display() {
        let e = McpError::Timeout;
        assert!(e.to_string().contains("timed out"));
    }

    #[test]
    fn test_cron_error_carries_expression() {
        let e = CronError::InvalidExpression {
            expr: "* * *".into(),
            reason: "expected 5 fields".into(),
        };
        assert!(e.to_string().contains("* * *"));
        assert!(e.to_string().contains("expected 5 fields"));
    }
}
