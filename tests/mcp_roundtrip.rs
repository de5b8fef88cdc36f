//! End-to-end capability proxy tests against a fake stdio server.
//!
//! The fake server is a `/bin/sh` loop that answers the JSON-RPC methods
//! the client sends, so the whole handshake/list/call path runs against a
//! real child process with real pipes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bareclaw::agent::audit::AuditLog;
use bareclaw::agent::tools::base::Tool;
use bareclaw::agent::tools::mcp_proxy::McpProxyTool;
use bareclaw::agent::tools::registry::ToolRegistry;
use bareclaw::mcp::pool::McpSessionPool;
use bareclaw::mcp::session::McpSession;
use tempfile::TempDir;

fn write_fake_server(dir: &Path) -> PathBuf {
    let path = dir.join("fake_mcp.sh");
    let script = concat!(
        "#!/bin/sh\n",
        "while read line; do\n",
        "  case \"$line\" in\n",
        "    *'\"initialize\"'*)\n",
        "      printf '{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"protocolVersion\":\"2025-03-26\"}}\\n' ;;\n",
        "    *'\"notifications/initialized\"'*) ;;\n",
        "    *'\"tools/list\"'*)\n",
        "      printf '{\"jsonrpc\":\"2.0\",\"id\":2,\"result\":{\"tools\":[{\"name\":\"ping\",\"description\":\"Replies with pong\"}]}}\\n' ;;\n",
        "    *'\"tools/call\"'*)\n",
        "      printf '{\"jsonrpc\":\"2.0\",\"id\":3,\"result\":{\"content\":[{\"type\":\"text\",\"text\":\"pong\"}]}}\\n' ;;\n",
        "  esac\n",
        "done\n",
    );
    fs::write(&path, script).unwrap();
    path
}

fn server_argv(dir: &Path) -> Vec<String> {
    vec![
        "/bin/sh".to_string(),
        write_fake_server(dir).to_string_lossy().to_string(),
    ]
}

#[tokio::test]
async fn test_probe_discovers_tools() {
    let tmp = TempDir::new().unwrap();
    let argv = server_argv(tmp.path());

    let mut session = McpSession::probe(&argv).await.expect("probe handshake");
    let tools = session.list_tools().await;
    session.shutdown().await;

    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].0, "ping");
    assert_eq!(tools[0].1, "Replies with pong");
}

#[tokio::test]
async fn test_pool_call_round_trip() {
    let tmp = TempDir::new().unwrap();
    let argv = server_argv(tmp.path());
    let pool = McpSessionPool::new();

    let output = pool
        .call_tool(&argv, "ping", &serde_json::json!({}))
        .await
        .expect("call through pool");
    assert_eq!(output, "pong");

    // A second call reuses the same session.
    let output = pool
        .call_tool(&argv, "ping", &serde_json::json!({}))
        .await
        .unwrap();
    assert_eq!(output, "pong");
    assert_eq!(pool.session_count().await, 1);

    pool.shutdown().await;
    assert_eq!(pool.session_count().await, 0);
}

#[tokio::test]
async fn test_proxied_tool_through_registry() {
    let tmp = TempDir::new().unwrap();
    let argv = server_argv(tmp.path());
    let pool = Arc::new(McpSessionPool::new());
    let audit = Arc::new(AuditLog::new(tmp.path()));

    // Discover with a probe session, then register proxies that share the
    // persistent pool — the same wiring the runtime does at startup.
    let mut probe = McpSession::probe(&argv).await.unwrap();
    let discovered = probe.list_tools().await;
    probe.shutdown().await;

    let mut registry = ToolRegistry::new();
    for (remote_name, description) in discovered {
        registry.register(Box::new(McpProxyTool::new(
            "fake",
            &remote_name,
            &description,
            argv.clone(),
            pool.clone(),
            audit.clone(),
        )));
    }

    let tool = registry.get("fake__ping").expect("proxied tool registered");
    let result = tool.execute(HashMap::new()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.output, "pong");

    // The proxy audits under the generic mcp_tool name with the remote
    // tool as the detail.
    let tail = audit.read_last(1);
    assert!(tail.contains("mcp_tool"));
    assert!(tail.contains("ping"));

    pool.shutdown().await;
}

#[tokio::test]
async fn test_probe_times_out_on_silent_server() {
    // A server that never writes anything must not hang the probe forever.
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("silent.sh");
    fs::write(&path, "#!/bin/sh\nwhile read line; do :; done\n").unwrap();
    let argv = vec![
        "/bin/sh".to_string(),
        path.to_string_lossy().to_string(),
    ];

    let started = std::time::Instant::now();
    let result = McpSession::probe(&argv).await;
    assert!(result.is_err());
    assert!(matches!(
        result.unwrap_err(),
        bareclaw::errors::McpError::Timeout
    ));
    // The 8 s deadline fired (leave slack for slow CI).
    assert!(started.elapsed() < std::time::Duration::from_secs(30));
}
