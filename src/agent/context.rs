//! Context management: conversation history, the tool-result buffer with
//! budget eviction, and tool output capping.

/// Default cap on a single tool result, in characters.
pub const MAX_TOOL_OUTPUT_CHARS: usize = 8000;
/// Default budget for the accumulated tool-result buffer.
pub const MAX_CONTEXT_CHARS: usize = 12_000;

/// Marker prepended to the context buffer after front-eviction.
pub const CONTEXT_EVICTION_MARKER: &str =
    "[... earlier tool results truncated due to context budget ...]\n";

/// Clamp a configured tool-output limit to the supported range.
pub fn clamp_tool_output_limit(n: usize) -> usize {
    n.clamp(1000, 32_000)
}

/// Clamp a configured context budget to the supported range.
pub fn clamp_context_limit(n: usize) -> usize {
    n.clamp(4000, 64_000)
}

/// Cap a tool output to `max` characters, appending a truncation marker
/// when anything was dropped.
pub fn cap_tool_output(raw: &str, max: usize) -> String {
    match raw.char_indices().nth(max) {
        None => raw.to_string(),
        Some((byte_idx, _)) => {
            format!(
                "{}\n[... output truncated at {} chars ...]",
                &raw[..byte_idx],
                max
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Message history
// ---------------------------------------------------------------------------

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One conversation message.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Ordered message sequence with a running character total.
///
/// Trimming evicts the oldest messages first but always retains at least
/// the most recent message, even when it alone exceeds the budget.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    total_chars: usize,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        let content = content.into();
        self.total_chars += content.len();
        self.messages.push(Message { role, content });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Evict oldest messages until the total fits `budget` or only one
    /// message remains.
    pub fn trim(&mut self, budget: usize) {
        while self.total_chars > budget && self.messages.len() > 1 {
            let evicted = self.messages.remove(0);
            self.total_chars -= evicted.content.len();
        }
    }

    /// Render as `role: content` lines, oldest first.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tool-result context buffer
// ---------------------------------------------------------------------------

/// Accumulates `[ok|error] <tool>: <output>` lines across tool rounds,
/// evicting from the front at newline boundaries once over budget.
#[derive(Debug)]
pub struct ContextBuffer {
    buf: String,
    max_chars: usize,
}

impl ContextBuffer {
    pub fn new(max_chars: usize) -> Self {
        Self {
            buf: String::new(),
            max_chars,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append one tool result entry and evict back to budget if needed.
    pub fn push_result(&mut self, tool_name: &str, success: bool, output: &str) {
        let tag = if success { "ok" } else { "error" };
        self.buf
            .push_str(&format!("[{}] {}: {}\n", tag, tool_name, output));
        self.evict_to_budget();
    }

    fn evict_to_budget(&mut self) {
        if self.buf.len() <= self.max_chars {
            return;
        }
        // A previous eviction's marker is dropped before re-measuring so
        // markers never stack.
        if self.buf.starts_with(CONTEXT_EVICTION_MARKER) {
            self.buf.drain(..CONTEXT_EVICTION_MARKER.len());
        }
        if self.buf.len() > self.max_chars {
            let mut overflow = self.buf.len() - self.max_chars;
            while overflow < self.buf.len() && !self.buf.is_char_boundary(overflow) {
                overflow += 1;
            }
            let cut = self.buf[overflow..]
                .find('\n')
                .map(|i| overflow + i + 1)
                .unwrap_or(self.buf.len());
            self.buf.drain(..cut);
        }
        self.buf.insert_str(0, CONTEXT_EVICTION_MARKER);
    }
}
