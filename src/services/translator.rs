use crate::constants::api::{API_KEY_HEADER, JSON_CONTENT_TYPE};
use crate::errors::ToolError;
use crate::operations::{BodyShape, HttpMethod, ItemRename, Location, Operation};
use crate::services::validation::Validation;
use crate::utils::redact::redact_value;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{Map, Value};
use url::Url;

/// Characters escaped inside one path segment; `/`, `%`, `?` and `#` included
/// so a value can never change the endpoint.
const PATH_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'\\')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A fully shaped upstream request, consumed once by the transport.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    pub operation: &'static str,
    pub method: HttpMethod,
    pub url: Url,
    /// Path relative to the API base, with path parameters substituted.
    pub path: String,
    pub query: Map<String, Value>,
    pub body: Option<Value>,
}

impl OutboundCall {
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn headers(&self, api_key: &str) -> Result<HeaderMap, ToolError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if self.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        let mut key = HeaderValue::from_str(api_key.trim()).map_err(|_| {
            ToolError::validation("API key contains characters not allowed in an HTTP header")
                .with_details(format!(
                    "The key sent as {} must be printable ASCII without line breaks.",
                    API_KEY_HEADER
                ))
        })?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        Ok(headers)
    }

    /// Redacted JSON view of the call for diagnostics.
    pub fn describe(&self) -> Value {
        serde_json::json!({
            "operation": self.operation,
            "method": self.method.as_str(),
            "url": self.url.as_str(),
            "path": self.path,
            "query": redact_value(&Value::Object(self.query.clone())),
            "body": self.body.as_ref().map(redact_value),
        })
    }
}

/// Turns an operation name plus loosely-typed arguments into an `OutboundCall`.
#[derive(Clone)]
pub struct Translator {
    base_url: Url,
    validation: Validation,
}

impl Translator {
    pub fn new(base_url: Url, validation: Validation) -> Self {
        Self {
            base_url,
            validation,
        }
    }

    pub fn translate(&self, operation: &Operation, raw: &Value) -> Result<OutboundCall, ToolError> {
        let mut params = self.validation.validate_params(operation, raw)?;

        let (path, encoded_path) = render_path(operation, &mut params)?;
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", base_path, encoded_path));

        let mut query = Map::new();
        let mut pairs = Vec::new();
        for spec in operation.params {
            if spec.location != Location::Query {
                continue;
            }
            if let Some(value) = params.remove(spec.name) {
                pairs.push((spec.name, query_value(&value)));
                query.insert(spec.name.to_string(), value);
            }
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let body = shape_body(operation, params)?;

        Ok(OutboundCall {
            operation: operation.name,
            method: operation.method,
            url,
            path,
            query,
            body,
        })
    }
}

/// Renders the path template twice: readable (for diagnostics) and with each
/// substituted value percent-encoded as a single segment.
fn render_path(
    operation: &Operation,
    params: &mut Map<String, Value>,
) -> Result<(String, String), ToolError> {
    let mut readable = Vec::new();
    let mut encoded = Vec::new();
    for segment in operation.path.split('/').filter(|s| !s.is_empty()) {
        let placeholder = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'));
        let Some(name) = placeholder else {
            readable.push(segment.to_string());
            encoded.push(segment.to_string());
            continue;
        };
        let value = params.remove(name).ok_or_else(|| {
            ToolError::validation(format!(
                "Missing path parameter '{}' for {}",
                name, operation.name
            ))
            .with_details(format!("Path template: {}", operation.path))
        })?;
        let text = query_value(&value).trim().to_string();
        encoded.push(utf8_percent_encode(&text, PATH_VALUE).to_string());
        readable.push(text);
    }
    Ok((
        format!("/{}", readable.join("/")),
        format!("/{}", encoded.join("/")),
    ))
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn shape_body(
    operation: &Operation,
    mut params: Map<String, Value>,
) -> Result<Option<Value>, ToolError> {
    for rename in operation.renames {
        if let Some(value) = params.get_mut(rename.param) {
            rename_in_items(value, rename);
        }
    }

    let body = match operation.body {
        BodyShape::None => None,
        BodyShape::Object => Some(Value::Object(body_fields(operation, &mut params))),
        BodyShape::Nested(key) => {
            let fields = body_fields(operation, &mut params);
            let mut wrapper = Map::new();
            wrapper.insert(key.to_string(), Value::Object(fields));
            Some(Value::Object(wrapper))
        }
        BodyShape::Bare(param) => Some(params.remove(param).ok_or_else(|| {
            ToolError::validation(format!("Missing body parameter '{}'", param))
        })?),
        BodyShape::BareWrapped { param, key } => {
            let items = params
                .remove(param)
                .and_then(|v| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .ok_or_else(|| {
                    ToolError::validation(format!("Parameter '{}' must be an array", param))
                })?;
            Some(Value::Array(
                items
                    .into_iter()
                    .map(|item| {
                        let mut wrapped = Map::new();
                        wrapped.insert(key.to_string(), item);
                        Value::Object(wrapped)
                    })
                    .collect(),
            ))
        }
    };
    Ok(body)
}

fn body_fields(operation: &Operation, params: &mut Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for spec in operation.params {
        let upstream = match spec.location {
            Location::Body => spec.name,
            Location::BodyAs(upstream) => upstream,
            Location::Path | Location::Query => continue,
        };
        if let Some(value) = params.remove(spec.name) {
            out.insert(upstream.to_string(), value);
        }
    }
    out
}

fn rename_in_items(value: &mut Value, rename: &ItemRename) {
    let Some(items) = value.as_array_mut() else {
        return;
    };
    for item in items {
        if let Some(obj) = item.as_object_mut() {
            if let Some(moved) = obj.remove(rename.from) {
                obj.insert(rename.to.to_string(), moved);
            }
        }
    }
}
