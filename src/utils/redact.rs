use crate::utils::text::truncate_chars;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

const REDACTED: &str = "[REDACTED]";
const INLINE_REDACTED: &str = "***REDACTED***";

const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "passphrase",
    "privatekey",
    "apikey",
    "accesstoken",
    "refreshtoken",
    "clientsecret",
    "authorization",
    "xn8napikey",
];

/// Keys whose object value holds secrets in every field, such as the `data`
/// of a credential or the values of `variables`.
const SECRET_MAPS: &[&str] = &["data", "variables"];

static INLINE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\beyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\b")
                .expect("jwt redaction regex"),
            INLINE_REDACTED,
        ),
        (
            Regex::new(r"\b(Bearer)\s+([A-Za-z0-9._~-]{10,})\b").expect("bearer redaction regex"),
            "$1 ***REDACTED***",
        ),
        (
            Regex::new(r"\bsk-[A-Za-z0-9_-]{10,}\b").expect("sk redaction regex"),
            "sk-***REDACTED***",
        ),
        (
            Regex::new(r"\bghp_[A-Za-z0-9]{20,}\b").expect("github redaction regex"),
            "ghp_***REDACTED***",
        ),
        (
            Regex::new(r#"(?i)\b(password|passwd|token|api[_-]?key|secret)\b\s*([:=])\s*([^\s"'`,}]+)"#)
                .expect("assignment redaction regex"),
            "$1$2***REDACTED***",
        ),
    ]
});

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn is_sensitive_key(key: &str) -> bool {
    let folded = fold_key(key);
    if folded.is_empty() {
        return false;
    }
    SENSITIVE_KEYS.contains(&folded.as_str())
        || folded.contains("secret")
        || folded.contains("token")
        || folded.contains("password")
}

/// Scrubs well-known secret shapes from free text, plus any `extra` literal
/// values (such as the API key in use), then caps the length.
pub fn redact_text(value: &str, max_chars: usize, extra: &[&str]) -> String {
    let mut out = value.to_string();
    for (re, replacement) in INLINE_PATTERNS.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *replacement).into_owned();
        }
    }
    for secret in extra {
        let needle = secret.trim();
        if needle.len() >= 6 {
            out = out.replace(needle, INLINE_REDACTED);
        }
    }
    truncate_chars(&out, max_chars)
}

fn mask_values(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.keys()
            .map(|key| (key.clone(), Value::String(REDACTED.to_string())))
            .collect(),
    )
}

/// Copy of `value` safe to echo back in diagnostics.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(redact_text(text, usize::MAX, &[])),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, entry) in map {
                let redacted = match entry {
                    Value::Object(inner) if SECRET_MAPS.contains(&key.as_str()) => {
                        mask_values(inner)
                    }
                    _ if is_sensitive_key(key) => Value::String(REDACTED.to_string()),
                    _ => redact_value(entry),
                };
                out.insert(key.clone(), redacted);
            }
            Value::Object(out)
        }
        _ => value.clone(),
    }
}
