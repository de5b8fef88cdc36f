//! Parsing of noisy model output into tool calls.
//!
//! Models wrap tool-call JSON in prose, markdown fences, or both. The
//! extractor is a balanced-brace state machine that respects JSON string
//! quoting and escapes; a naive `find('{') … rfind('}')` fails on nested
//! objects and on braces inside strings.

use std::collections::HashMap;

use serde_json::Value;

/// One tool call parsed from a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: HashMap<String, Value>,
}

/// Extract the first balanced `{...}` object from `text`.
///
/// Tracks brace depth together with an in-string flag and an escape flag,
/// so `{"a": "b}"}` and `{"q": "say \"hi\""}` extract correctly. Markdown
/// code fences need no special handling: the scanner starts at the first
/// `{` and fences contain none.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the tool calls out of a model response.
///
/// Returns an empty vector when the response holds no parseable
/// `tool_calls` array — the signal that the response is a final answer.
///
/// Two call shapes are accepted:
/// - `{"function": {"name": N, "arguments": "<json string>"}}` (OpenAI style)
/// - `{"function": N, "arguments": {…}}` (common model shorthand)
pub fn parse_tool_calls(response: &str) -> Vec<ToolCall> {
    let Some(raw) = extract_json_object(response) else {
        return Vec::new();
    };
    let Ok(parsed) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    let Some(calls) = parsed.get("tool_calls").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    calls
        .iter()
        .filter_map(|entry| {
            let function = entry.get("function")?;
            if let Some(obj) = function.as_object() {
                // Shape A: nested function object, string-encoded arguments.
                let name = obj.get("name")?.as_str()?.to_string();
                let arguments = value_to_args(obj.get("arguments"));
                Some(ToolCall { name, arguments })
            } else if let Some(name) = function.as_str() {
                // Shape B: bare function name, sibling arguments object.
                Some(ToolCall {
                    name: name.to_string(),
                    arguments: value_to_args(entry.get("arguments")),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Coerce an arguments value into a map: objects pass through, JSON-encoded
/// strings are parsed, anything else becomes empty.
fn value_to_args(value: Option<&Value>) -> HashMap<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone().into_iter().collect(),
        Some(Value::String(s)) => serde_json::from_str::<Value>(s)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .map(|map| map.into_iter().collect())
            .unwrap_or_default(),
        _ => HashMap::new(),
    }
}
