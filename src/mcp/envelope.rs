use crate::errors::ToolError;
use serde_json::Value;

fn text_content(payload: &Value, is_error: bool) -> Value {
    let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    serde_json::json!({
        "content": [ { "type": "text", "text": text } ],
        "isError": is_error,
    })
}

/// Wraps an upstream payload as a `tools/call` result.
pub fn success_envelope(payload: &Value) -> Value {
    text_content(payload, false)
}

/// Wraps a normalized error as a `tools/call` result flagged with `isError`.
pub fn error_envelope(error: &ToolError) -> Value {
    text_content(&serde_json::json!({ "error": error.to_value() }), true)
}
