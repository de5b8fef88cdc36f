//! One capability-server session: a child process speaking newline-delimited
//! JSON-RPC 2.0 on its stdin/stdout. Stderr is discarded.

use std::process::Stdio;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::errors::McpError;

/// Protocol version sent in the `initialize` handshake.
const PROTOCOL_VERSION: &str = "2025-03-26";

/// Per-read deadline for probe sessions, so a hung server cannot stall
/// startup. Pool sessions read blocking.
pub const PROBE_READ_TIMEOUT: Duration = Duration::from_secs(8);

/// A live session with one capability server.
#[derive(Debug)]
pub struct McpSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
    read_deadline: Option<Duration>,
}

impl McpSession {
    /// Spawn the server and perform the mandatory handshake.
    ///
    /// A `read_deadline` of `Some` makes this a probe session; `None` a
    /// pool session.
    pub async fn start(argv: &[String], read_deadline: Option<Duration>) -> Result<Self, McpError> {
        let program = argv
            .first()
            .ok_or_else(|| McpError::Spawn("empty argv".to_string()))?;

        let mut child = Command::new(program)
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| McpError::Spawn(format!("{}: {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Spawn("no stdin pipe".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| McpError::Spawn("no stdout pipe".to_string()))?;

        let mut session = Self {
            child,
            stdin,
            stdout,
            next_id: 1,
            read_deadline,
        };
        session.handshake().await?;
        Ok(session)
    }

    /// Spawn a short-lived probe session with read deadlines.
    pub async fn probe(argv: &[String]) -> Result<Self, McpError> {
        Self::start(argv, Some(PROBE_READ_TIMEOUT)).await
    }

    /// `initialize` request, discard the response, `notifications/initialized`.
    async fn handshake(&mut self) -> Result<(), McpError> {
        let id = self.take_id();
        self.write_frame(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "initialize",
            "params": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "bareclaw", "version": env!("CARGO_PKG_VERSION")},
            },
        }))
        .await?;
        // The response content is not inspected.
        self.read_line().await?;
        self.write_frame(&json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
            "params": {},
        }))
        .await
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    async fn write_frame(&mut self, frame: &Value) -> Result<(), McpError> {
        let mut line = frame.to_string();
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| McpError::Write(e.to_string()))
    }

    async fn read_line(&mut self) -> Result<String, McpError> {
        let mut line = String::new();
        let read = self.stdout.read_line(&mut line);
        let n = match self.read_deadline {
            Some(deadline) => tokio::time::timeout(deadline, read)
                .await
                .map_err(|_| McpError::Timeout)?,
            None => read.await,
        };
        match n {
            Ok(0) => Err(McpError::ClosedPipe),
            Ok(_) => Ok(line),
            Err(e) => Err(McpError::Write(e.to_string())),
        }
    }

    /// Send a request and read its response line.
    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        let id = self.take_id();
        self.write_frame(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;
        let line = self.read_line().await?;
        serde_json::from_str(&line).map_err(|e| McpError::Protocol(e.to_string()))
    }

    /// Discover published tools as `(name, description)` pairs.
    ///
    /// Lenient by design: a malformed response or a missing `tools` array
    /// yields an empty list rather than an error.
    pub async fn list_tools(&mut self) -> Vec<(String, String)> {
        let response = match self.request("tools/list", json!({})).await {
            Ok(r) => r,
            Err(e) => {
                debug!("tools/list failed: {}", e);
                return Vec::new();
            }
        };
        let Some(tools) = response
            .get("result")
            .and_then(|r| r.get("tools"))
            .and_then(|t| t.as_array())
        else {
            return Vec::new();
        };
        tools
            .iter()
            .filter_map(|tool| {
                let name = tool.get("name")?.as_str()?.to_string();
                let description = tool
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or("")
                    .to_string();
                Some((name, description))
            })
            .collect()
    }

    /// Invoke a remote tool and render its response as text.
    ///
    /// Tool-level failures come back as text (the transport succeeded);
    /// only transport and framing problems are errors.
    pub async fn call_tool(&mut self, name: &str, arguments: &Value) -> Result<String, McpError> {
        let response = self
            .request(
                "tools/call",
                json!({"name": name, "arguments": arguments}),
            )
            .await?;

        if let Some(message) = response
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return Ok(format!("(mcp error: {})", message));
        }

        let result = response.get("result").cloned().unwrap_or(Value::Null);
        Ok(render_call_result(&result))
    }

    /// Close stdin and await child exit.
    pub async fn shutdown(mut self) {
        let _ = self.stdin.shutdown().await;
        drop(self.stdin);
        let _ = self.child.wait().await;
    }
}

/// Render a `tools/call` result into plain text.
///
/// The result may be an object with `content[]` and `isError`, a bare
/// content array, or a plain string. Text blocks are newline-joined.
fn render_call_result(result: &Value) -> String {
    if let Some(s) = result.as_str() {
        return s.to_string();
    }

    let (blocks, is_error) = match result {
        Value::Array(items) => (Some(items), false),
        Value::Object(map) => (
            map.get("content").and_then(|c| c.as_array()),
            map.get("isError").and_then(|e| e.as_bool()).unwrap_or(false),
        ),
        _ => (None, false),
    };

    let texts: Vec<&str> = blocks
        .map(|items| {
            items
                .iter()
                .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if texts.is_empty() {
        if is_error {
            "(mcp: tool returned empty error)".to_string()
        } else {
            "(ok)".to_string()
        }
    } else {
        texts.join("\n")
    }
}
