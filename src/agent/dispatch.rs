//! Per-response tool dispatch.
//!
//! Takes one model response, parses out tool calls, executes them in
//! emission order, and appends the results to the turn's context buffer.

use tracing::{debug, warn};

use crate::agent::context::{cap_tool_output, ContextBuffer};
use crate::agent::protocol::parse_tool_calls;
use crate::agent::tools::base::ToolResult;
use crate::agent::tools::registry::ToolRegistry;

/// Dispatch any tool calls in `response` into `buffer`.
///
/// Returns `false` when the response carries no tool calls — the signal
/// that it is the final answer. Unknown tool names are skipped; individual
/// tool failures are recorded in the buffer and never abort the turn.
pub async fn dispatch(
    response: &str,
    registry: &ToolRegistry,
    buffer: &mut ContextBuffer,
    max_tool_output_chars: usize,
) -> bool {
    let calls = parse_tool_calls(response);
    if calls.is_empty() {
        return false;
    }

    for call in calls {
        let Some(tool) = registry.get(&call.name) else {
            debug!("model requested unknown tool '{}', skipping", call.name);
            continue;
        };
        let result = match tool.execute(call.arguments).await {
            Ok(r) => r,
            Err(e) => {
                warn!("tool '{}' errored: {}", call.name, e);
                ToolResult::failure(format!("tool error: {}", e))
            }
        };
        let output = cap_tool_output(&result.output, max_tool_output_chars);
        buffer.push_result(&call.name, result.success, &output);
    }
    true
}
