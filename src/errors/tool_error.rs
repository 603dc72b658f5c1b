use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    Validation,
    Auth,
    Permission,
    NotFound,
    BadRequest,
    BusinessRule,
    UpstreamServer,
    Upstream,
    Timeout,
    Connection,
    Dns,
    Unexpected,
}

impl ToolErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolErrorKind::Validation => "validation",
            ToolErrorKind::Auth => "auth",
            ToolErrorKind::Permission => "permission",
            ToolErrorKind::NotFound => "not_found",
            ToolErrorKind::BadRequest => "bad_request",
            ToolErrorKind::BusinessRule => "business_rule",
            ToolErrorKind::UpstreamServer => "upstream_server",
            ToolErrorKind::Upstream => "upstream",
            ToolErrorKind::Timeout => "timeout",
            ToolErrorKind::Connection => "connection",
            ToolErrorKind::Dns => "dns",
            ToolErrorKind::Unexpected => "unexpected",
        }
    }
}

/// Either an HTTP-status-like number or a symbolic marker such as `TIMEOUT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Status(u16),
    Symbol(String),
}

impl ErrorCode {
    pub const INVALID_PARAMS: &'static str = "INVALID_PARAMS";
    pub const UNKNOWN_TOOL: &'static str = "UNKNOWN_TOOL";
    pub const MISSING_API_KEY: &'static str = "MISSING_API_KEY";
    pub const TIMEOUT: &'static str = "TIMEOUT";
    pub const CONNECTION_ERROR: &'static str = "CONNECTION_ERROR";
    pub const DNS_ERROR: &'static str = "DNS_ERROR";
    pub const CONFIG_ERROR: &'static str = "CONFIG_ERROR";

    pub fn symbol(value: &str) -> Self {
        ErrorCode::Symbol(value.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ErrorCode::Status(status) => Some(*status),
            ErrorCode::Symbol(_) => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Status(status) => write!(f, "{}", status),
            ErrorCode::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// The single error shape every failure path is converted into.
///
/// `message` is a short summary safe to show to end users; `details` is the
/// free-text diagnostic (endpoint, method, request shape, upstream body).
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: ErrorCode,
    pub message: String,
    pub details: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            details: String::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::Validation,
            ErrorCode::symbol(ErrorCode::INVALID_PARAMS),
            message,
        )
    }

    pub fn missing_api_key(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::Auth,
            ErrorCode::symbol(ErrorCode::MISSING_API_KEY),
            message,
        )
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::Timeout,
            ErrorCode::symbol(ErrorCode::TIMEOUT),
            message,
        )
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::Connection,
            ErrorCode::symbol(ErrorCode::CONNECTION_ERROR),
            message,
        )
    }

    pub fn dns(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::Dns,
            ErrorCode::symbol(ErrorCode::DNS_ERROR),
            message,
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::Validation,
            ErrorCode::symbol(ErrorCode::CONFIG_ERROR),
            message,
        )
    }

    pub fn upstream_status(kind: ToolErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self::new(kind, ErrorCode::Status(status), message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Unexpected, ErrorCode::Status(500), message)
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "code": self.code,
            "kind": self.kind.as_str(),
            "details": self.details,
        })
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::unexpected(err.to_string())
    }
}
