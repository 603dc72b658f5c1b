//! Builds the normalized `ToolError` for every failure the transport can see:
//! upstream status codes, timeouts, network failures and anything else.

use crate::constants::limits::{CAUSE_CHAIN_MAX_LINES, DIAGNOSTIC_MAX_CHARS};
use crate::errors::{ToolError, ToolErrorKind};
use crate::services::translator::OutboundCall;
use crate::utils::redact::redact_value;
use crate::utils::text::{indent, truncate_chars};
use serde_json::Value;
use std::error::Error as StdError;

const AUTH_GUIDANCE: &[&str] = &[
    "the API key is valid and has not been revoked or expired",
    "the key is passed as-is, without a \"Bearer \" prefix or surrounding whitespace",
    "the key was issued by the n8n instance at the configured base URL",
    "the n8n instance is reachable and the public API is enabled",
];

const PERMISSION_GUIDANCE: &[&str] = &[
    "the API key's owner has the role or scope this operation requires",
    "the resource belongs to a project the key's owner can access",
    "the instance's rate limit has not been exceeded; wait and try again",
    "the feature is available on the instance's license tier",
];

const NOT_FOUND_GUIDANCE: &[&str] = &[
    "the resource ID is correct and belongs to this instance",
    "the resource has not been deleted",
    "the base URL points at the API root (ending in /api/v1)",
];

const BAD_REQUEST_GUIDANCE: &[&str] = &[
    "all required fields are present with the expected types",
    "IDs and enum values are spelled exactly as n8n returns them",
    "workflow nodes and connections reference each other by node name",
];

const BUSINESS_RULE_CAUSES: &[&str] = &[
    "the resource is in a state that does not allow this change (for example an active workflow)",
    "a dependency is missing or unmet (for example a credential or node type)",
    "a uniqueness constraint would be violated",
];

const SERVER_GUIDANCE: &[&str] = &[
    "the n8n instance is healthy and its database is reachable",
    "the n8n server logs around this time for a stack trace",
    "retry after the instance has recovered",
];

const CONNECTION_GUIDANCE: &[&str] = &[
    "n8n is running and listening on the configured host and port",
    "the base URL scheme (http/https) matches the server",
    "no firewall or proxy is blocking the connection",
];

const DNS_GUIDANCE: &[&str] = &[
    "the host name in the base URL is spelled correctly",
    "DNS resolution works from this machine",
    "use an IP address if the host is not in DNS",
];

/// Line-oriented diagnostic text with labelled sections.
struct Diagnostic {
    lines: Vec<String>,
}

impl Diagnostic {
    fn new(headline: impl Into<String>) -> Self {
        Self {
            lines: vec![headline.into()],
        }
    }

    fn field(mut self, label: &str, value: impl AsRef<str>) -> Self {
        self.lines.push(format!("{}: {}", label, value.as_ref()));
        self
    }

    fn block(mut self, label: &str, value: impl AsRef<str>) -> Self {
        self.lines.push(format!("{}:", label));
        self.lines.push(indent(value.as_ref(), 2));
        self
    }

    fn checklist(mut self, label: &str, items: &[&str]) -> Self {
        self.lines.push(format!("{}:", label));
        for item in items {
            self.lines.push(format!("  - {}", item));
        }
        self
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn request_params(call: &OutboundCall) -> String {
    let query = redact_value(&Value::Object(call.query.clone()));
    let body = call.body.as_ref().map(redact_value).unwrap_or(Value::Null);
    pretty(&serde_json::json!({ "query": query, "body": body }))
}

/// Parses an upstream body as JSON, wrapping unparsable text as `{"raw": ...}`.
pub fn parse_error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw": text }))
}

fn upstream_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Upstream-reported validation errors, from `errors: [...]` entries that are
/// strings or objects with `message` (and optionally `path`).
fn upstream_validation_errors(body: &Value) -> Vec<String> {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return Vec::new();
    };
    errors
        .iter()
        .filter_map(|entry| match entry {
            Value::String(text) => Some(text.clone()),
            Value::Object(obj) => {
                let message = obj.get("message").and_then(Value::as_str)?;
                let path = obj
                    .get("path")
                    .map(|p| p.as_str().map(str::to_string).unwrap_or_else(|| p.to_string()));
                Some(match path {
                    Some(path) => format!("{}: {}", path, message),
                    None => message.to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Maps a non-2xx response to the matching normalized error.
pub fn from_status(call: &OutboundCall, base_url: &str, status: u16, body: &Value) -> ToolError {
    let endpoint = call.endpoint();
    let url = call.url.as_str();
    match status {
        401 => ToolError::upstream_status(
            ToolErrorKind::Auth,
            status,
            "Authentication failed with n8n API",
        )
        .with_details(
            Diagnostic::new("n8n rejected the API key (HTTP 401).")
                .field("Endpoint", &endpoint)
                .field("URL", url)
                .checklist("Check that", AUTH_GUIDANCE)
                .field("Base URL", base_url)
                .block("Response", pretty(body))
                .finish(),
        ),
        403 => ToolError::upstream_status(
            ToolErrorKind::Permission,
            status,
            "Permission denied or rate limit exceeded on n8n API",
        )
        .with_details(
            Diagnostic::new("n8n refused the operation (HTTP 403).")
                .field("Endpoint", &endpoint)
                .checklist("Check that", PERMISSION_GUIDANCE)
                .block("Response", pretty(body))
                .finish(),
        ),
        404 => ToolError::upstream_status(
            ToolErrorKind::NotFound,
            status,
            "Resource not found in n8n",
        )
        .with_details(
            Diagnostic::new("The requested resource does not exist (HTTP 404).")
                .field("Endpoint", &endpoint)
                .field("Requested path", &call.path)
                .block(
                    "Query parameters",
                    pretty(&redact_value(&Value::Object(call.query.clone()))),
                )
                .checklist("Check that", NOT_FOUND_GUIDANCE)
                .block("Response", pretty(body))
                .finish(),
        ),
        400 => {
            let reported = upstream_validation_errors(body);
            let mut diagnostic = Diagnostic::new("n8n rejected the request parameters (HTTP 400).")
                .field("Endpoint", &endpoint);
            diagnostic = if reported.is_empty() {
                if let Some(message) = upstream_message(body) {
                    diagnostic = diagnostic.field("n8n says", message);
                }
                diagnostic.checklist("Check that", BAD_REQUEST_GUIDANCE)
            } else {
                let items: Vec<&str> = reported.iter().map(String::as_str).collect();
                diagnostic.checklist("Validation errors reported by n8n", &items)
            };
            ToolError::upstream_status(
                ToolErrorKind::BadRequest,
                status,
                "Invalid request parameters for n8n API",
            )
            .with_details(
                diagnostic
                    .block("Request", request_params(call))
                    .block("Response", pretty(body))
                    .finish(),
            )
        }
        422 => ToolError::upstream_status(
            ToolErrorKind::BusinessRule,
            status,
            "n8n rejected the request: business rule validation failed",
        )
        .with_details(
            Diagnostic::new("The request was well-formed but n8n could not apply it (HTTP 422).")
                .field("Endpoint", &endpoint)
                .field(
                    "n8n says",
                    upstream_message(body).unwrap_or_else(|| "(no message)".to_string()),
                )
                .checklist("Common causes", BUSINESS_RULE_CAUSES)
                .block("Request", request_params(call))
                .finish(),
        ),
        500 => ToolError::upstream_status(
            ToolErrorKind::UpstreamServer,
            status,
            "n8n API internal server error",
        )
        .with_details(
            Diagnostic::new("n8n failed while handling the request (HTTP 500).")
                .field("Endpoint", &endpoint)
                .checklist("Check", SERVER_GUIDANCE)
                .block("Response", pretty(body))
                .finish(),
        ),
        _ => {
            let kind = if (500..600).contains(&status) {
                ToolErrorKind::UpstreamServer
            } else {
                ToolErrorKind::Upstream
            };
            ToolError::upstream_status(
                kind,
                status,
                format!("n8n API request failed with status {}", status),
            )
            .with_details(
                Diagnostic::new(format!("Unexpected HTTP status {} from n8n.", status))
                    .field("Method", call.method.as_str())
                    .field("Endpoint", url)
                    .block(
                        "Request",
                        truncate_chars(&request_params(call), DIAGNOSTIC_MAX_CHARS),
                    )
                    .block("Response", truncate_chars(&pretty(body), DIAGNOSTIC_MAX_CHARS))
                    .finish(),
            )
        }
    }
}

pub fn timeout(call: &OutboundCall, timeout_ms: u64) -> ToolError {
    ToolError::timeout(format!(
        "Request to n8n API timed out after {}ms",
        timeout_ms
    ))
    .with_details(
        Diagnostic::new("No response arrived before the deadline; the request was aborted.")
            .field("Endpoint", call.endpoint())
            .field("URL", call.url.as_str())
            .field("Timeout", format!("{}ms", timeout_ms))
            .checklist(
                "Check",
                &[
                    "the n8n instance is responsive",
                    "large list calls use a smaller limit",
                    "raise the timeout (N8N_TIMEOUT_MS / --timeout-ms) for slow instances",
                ],
            )
            .finish(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    Timeout,
    Dns,
    Connection,
    Other,
}

/// Classifies a transport error by walking its source chain.
pub fn classify(err: &(dyn StdError + 'static)) -> NetworkFailure {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    let mut saw_connect = false;
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::TimedOut => return NetworkFailure::Timeout,
                std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::NotConnected
                | std::io::ErrorKind::BrokenPipe => return NetworkFailure::Connection,
                _ => {}
            }
        }
        let text = e.to_string().to_lowercase();
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return NetworkFailure::Dns;
        }
        if text.contains("connection refused")
            || text.contains("connection reset")
            || text.contains("connection closed")
        {
            return NetworkFailure::Connection;
        }
        if let Some(req) = e.downcast_ref::<reqwest::Error>() {
            if req.is_timeout() {
                return NetworkFailure::Timeout;
            }
            if req.is_connect() {
                saw_connect = true;
            }
        }
        current = e.source();
    }
    if saw_connect {
        NetworkFailure::Connection
    } else {
        NetworkFailure::Other
    }
}

fn cause_chain(err: &(dyn StdError + 'static)) -> String {
    let mut lines = Vec::new();
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if lines.len() >= CAUSE_CHAIN_MAX_LINES {
            lines.push("...".to_string());
            break;
        }
        lines.push(e.to_string());
        current = e.source();
    }
    lines.join("\n")
}

/// Normalizes an error raised before any response arrived.
pub fn from_transport(
    call: &OutboundCall,
    timeout_ms: u64,
    err: &(dyn StdError + 'static),
) -> ToolError {
    match classify(err) {
        NetworkFailure::Timeout => timeout(call, timeout_ms),
        NetworkFailure::Dns => {
            let host = call.url.host_str().unwrap_or("").to_string();
            ToolError::dns(format!("Unable to resolve n8n API host {}", host)).with_details(
                Diagnostic::new("The host name in the base URL could not be resolved.")
                    .field("URL", call.url.as_str())
                    .field("Error", err.to_string())
                    .checklist("Check that", DNS_GUIDANCE)
                    .finish(),
            )
        }
        NetworkFailure::Connection => ToolError::connection("Unable to connect to n8n API")
            .with_details(
                Diagnostic::new("The connection to n8n failed before a response arrived.")
                    .field("URL", call.url.as_str())
                    .field("Error", err.to_string())
                    .checklist("Check that", CONNECTION_GUIDANCE)
                    .finish(),
            ),
        NetworkFailure::Other => unexpected(call, err),
    }
}

pub fn unexpected(call: &OutboundCall, err: &(dyn StdError + 'static)) -> ToolError {
    ToolError::unexpected(format!(
        "Unexpected error while calling n8n API: {}",
        err
    ))
    .with_details(
        Diagnostic::new("An unexpected error occurred while executing the request.")
            .field("Error", err.to_string())
            .field("Endpoint", call.endpoint())
            .field("Method", call.method.as_str())
            .block("Call", pretty(&call.describe()))
            .block("Caused by", cause_chain(err))
            .finish(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::operations::find_operation;
    use crate::services::translator::Translator;
    use crate::services::validation::Validation;
    use serde_json::json;
    use std::fmt;
    use url::Url;

    const BASE: &str = "https://n8n.example.com/api/v1";

    fn call(name: &str, args: Value) -> OutboundCall {
        Translator::new(Url::parse(BASE).unwrap(), Validation::new())
            .translate(find_operation(name).unwrap(), &args)
            .unwrap()
    }

    #[test]
    fn unauthorized_has_fixed_summary_for_any_body() {
        let c = call("list-workflows", json!({}));
        for body in [json!({"message": "unauthorized"}), json!({"raw": "<html>"}), json!(null)] {
            let err = from_status(&c, BASE, 401, &body);
            assert_eq!(err.code, ErrorCode::Status(401));
            assert_eq!(err.kind, ToolErrorKind::Auth);
            assert_eq!(err.message, "Authentication failed with n8n API");
            assert!(err.details.contains("GET /workflows"));
        }
    }

    #[test]
    fn not_found_mentions_requested_id() {
        let c = call("get-workflow", json!({ "id": "wf-123" }));
        let err = from_status(&c, BASE, 404, &json!({"message": "Not Found"}));
        assert_eq!(err.kind, ToolErrorKind::NotFound);
        assert!(err.details.contains("wf-123"));
    }

    #[test]
    fn bad_request_itemizes_upstream_errors() {
        let c = call("create-tag", json!({ "name": "ops" }));
        let body = json!({ "errors": ["name is too long", { "path": "name", "message": "taken" }] });
        let err = from_status(&c, BASE, 400, &body);
        assert_eq!(err.kind, ToolErrorKind::BadRequest);
        assert!(err.details.contains("  - name is too long"));
        assert!(err.details.contains("  - name: taken"));
        assert!(!err.details.contains("Check that"));
    }

    #[test]
    fn bad_request_without_errors_gives_guidance() {
        let c = call("create-tag", json!({ "name": "ops" }));
        let err = from_status(&c, BASE, 400, &json!({ "message": "request/body must have name" }));
        assert!(err.details.contains("n8n says: request/body must have name"));
        assert!(err.details.contains("Check that"));
        assert!(err.details.contains("\"name\": \"ops\""));
    }

    #[test]
    fn unprocessable_includes_upstream_message() {
        let c = call("activate-workflow", json!({ "id": "w1" }));
        let err = from_status(&c, BASE, 422, &json!({ "message": "Workflow has no trigger" }));
        assert_eq!(err.kind, ToolErrorKind::BusinessRule);
        assert!(err.details.contains("Workflow has no trigger"));
    }

    #[test]
    fn other_statuses_truncate_large_bodies() {
        let c = call("list-tags", json!({}));
        let body = json!({ "raw": "x".repeat(5_000) });
        let err = from_status(&c, BASE, 502, &body);
        assert_eq!(err.kind, ToolErrorKind::UpstreamServer);
        assert_eq!(err.code, ErrorCode::Status(502));
        assert!(err.details.contains("[truncated"));
        assert!(err.details.len() < 3_500);

        let err = from_status(&c, BASE, 409, &json!({}));
        assert_eq!(err.kind, ToolErrorKind::Upstream);
        assert_eq!(err.message, "n8n API request failed with status 409");
    }

    #[test]
    fn parse_error_body_wraps_raw_text() {
        assert_eq!(parse_error_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_error_body("Bad Gateway"), json!({"raw": "Bad Gateway"}));
    }

    #[derive(Debug)]
    struct Wrapped {
        message: &'static str,
        source: std::io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn classify_walks_the_source_chain() {
        let refused = Wrapped {
            message: "error sending request",
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(classify(&refused), NetworkFailure::Connection);

        let dns = Wrapped {
            message: "error trying to connect",
            source: std::io::Error::new(
                std::io::ErrorKind::Other,
                "failed to lookup address information: Name or service not known",
            ),
        };
        assert_eq!(classify(&dns), NetworkFailure::Dns);

        let other = Wrapped {
            message: "builder error",
            source: std::io::Error::new(std::io::ErrorKind::Other, "bad things"),
        };
        assert_eq!(classify(&other), NetworkFailure::Other);
    }

    #[test]
    fn transport_errors_get_symbolic_codes() {
        let c = call("list-tags", json!({}));
        let refused = Wrapped {
            message: "error sending request",
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        let err = from_transport(&c, 10_000, &refused);
        assert_eq!(err.code, ErrorCode::symbol(ErrorCode::CONNECTION_ERROR));
        assert!(err.details.contains(c.url.as_str()));

        let other = Wrapped {
            message: "builder error",
            source: std::io::Error::new(std::io::ErrorKind::Other, "bad things"),
        };
        let err = from_transport(&c, 10_000, &other);
        assert_eq!(err.code, ErrorCode::Status(500));
        assert_eq!(err.kind, ToolErrorKind::Unexpected);
        assert!(err.details.contains("Caused by:"));
        assert!(err.details.contains("bad things"));
        assert!(err.details.contains("\"operation\": \"list-tags\""));
    }

    #[test]
    fn timeout_reports_configured_value_and_endpoint() {
        let c = call("get-workflow", json!({ "id": "w1" }));
        let err = timeout(&c, 10_000);
        assert_eq!(err.code, ErrorCode::symbol(ErrorCode::TIMEOUT));
        assert!(err.message.contains("10000ms"));
        assert!(err.details.contains("GET /workflows/w1"));
    }
}
