#![allow(dead_code)]

use async_trait::async_trait;
use n8n_mcp::config::normalize_base_url;
use n8n_mcp::errors::ToolError;
use n8n_mcp::services::logger::{LogLevel, Logger};
use n8n_mcp::services::n8n_client::Transport;
use n8n_mcp::services::translator::OutboundCall;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn restore_env(key: &str, previous: Option<String>) {
    match previous {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}

pub fn quiet_logger() -> Logger {
    Logger::new("test", LogLevel::Error)
}

pub fn base_url(raw: &str) -> url::Url {
    normalize_base_url(raw).expect("base url")
}

/// Transport double that records every call and answers with a fixed result.
pub struct RecordingTransport {
    calls: StdMutex<Vec<(OutboundCall, String)>>,
    reply: Result<Value, ToolError>,
}

impl RecordingTransport {
    pub fn replying(reply: Result<Value, ToolError>) -> Self {
        Self {
            calls: StdMutex::new(Vec::new()),
            reply,
        }
    }

    pub fn ok(payload: Value) -> Self {
        Self::replying(Ok(payload))
    }

    pub fn calls(&self) -> Vec<(OutboundCall, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, call: &OutboundCall, api_key: &str) -> Result<Value, ToolError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((call.clone(), api_key.to_string()));
        self.reply.clone()
    }
}
