use crate::constants::credentials::{API_KEY_HEADERS, AUTHORIZATION_HEADER, BEARER_PREFIX};
use serde_json::{Map, Value};

fn header_value<'a>(headers: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .flat_map(|(_, value)| match value {
            Value::String(text) => vec![text.as_str()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        })
        .map(str::trim)
        .find(|text| !text.is_empty())
}

fn bearer_token(value: &str) -> Option<&str> {
    let prefix = value.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

/// Picks the API key for one call: dedicated key headers first, then a bearer
/// token, then the configured default.
pub fn resolve_credential(
    headers: Option<&Map<String, Value>>,
    fallback: Option<&str>,
) -> Option<String> {
    if let Some(headers) = headers {
        for name in API_KEY_HEADERS {
            if let Some(value) = header_value(headers, name) {
                return Some(value.to_string());
            }
        }
        if let Some(token) = header_value(headers, AUTHORIZATION_HEADER).and_then(bearer_token) {
            return Some(token.to_string());
        }
    }
    fallback
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}
