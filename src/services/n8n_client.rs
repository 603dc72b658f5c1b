use crate::constants::network::USER_AGENT;
use crate::errors::ToolError;
use crate::services::diagnostics;
use crate::services::logger::Logger;
use crate::services::translator::OutboundCall;
use crate::utils::redact::redact_text;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

/// Executes a shaped call against the upstream API.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, call: &OutboundCall, api_key: &str) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct N8nClient {
    logger: Logger,
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl N8nClient {
    pub fn new(logger: Logger, base_url: Url, timeout_ms: u64) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ToolError::config(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("client"),
            client,
            base_url,
            timeout_ms,
        })
    }

    async fn exchange(
        &self,
        call: &OutboundCall,
        api_key: &str,
    ) -> Result<Result<(StatusCode, String), reqwest::Error>, ToolError> {
        let headers = call.headers(api_key)?;
        let mut request = self
            .client
            .request(call.method.to_reqwest(), call.url.clone())
            .headers(headers);
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        let sent = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };
        Ok(sent.await)
    }

    /// Returns the upstream status alongside the payload.
    async fn perform(&self, call: &OutboundCall, api_key: &str) -> Result<(u16, Value), ToolError> {
        let outcome =
            tokio::time::timeout(Duration::from_millis(self.timeout_ms), self.exchange(call, api_key))
                .await
                .map_err(|_| diagnostics::timeout(call, self.timeout_ms))??;

        let (status, text) = outcome
            .map_err(|err| diagnostics::from_transport(call, self.timeout_ms, &err))?;

        if status == StatusCode::NO_CONTENT {
            return Ok((
                status.as_u16(),
                serde_json::json!({
                    "success": true,
                    "message": "Operation successful.",
                }),
            ));
        }
        if status.is_success() {
            return Ok((status.as_u16(), parse_success_body(status.as_u16(), &text)));
        }
        let body = diagnostics::parse_error_body(&text);
        Err(diagnostics::from_status(
            call,
            self.base_url.as_str(),
            status.as_u16(),
            &body,
        ))
    }
}

/// Parses a 2xx body, substituting a marker payload when it is empty or not JSON.
pub fn parse_success_body(status: u16, text: &str) -> Value {
    if !text.trim().is_empty() {
        if let Ok(parsed) = serde_json::from_str::<Value>(text) {
            return parsed;
        }
    }
    serde_json::json!({
        "success": true,
        "status": status,
        "message": "Request succeeded but no JSON body was returned.",
    })
}

fn request_log_meta(
    call: &OutboundCall,
    result: &Result<(u16, Value), ToolError>,
    elapsed_ms: u64,
) -> Value {
    let mut meta = serde_json::json!({
        "operation": call.operation,
        "method": call.method.as_str(),
        "path": call.path,
        "duration_ms": elapsed_ms,
    });
    if let Some(obj) = meta.as_object_mut() {
        match result {
            Ok((status, _)) => {
                obj.insert("status".to_string(), Value::from(*status));
                obj.insert("outcome".to_string(), Value::from("ok"));
            }
            Err(err) => {
                obj.insert("status".to_string(), serde_json::json!(err.code.status()));
                obj.insert("outcome".to_string(), Value::from(err.kind.as_str()));
                obj.insert("code".to_string(), serde_json::json!(err.code));
            }
        }
    }
    meta
}

#[async_trait]
impl Transport for N8nClient {
    async fn execute(&self, call: &OutboundCall, api_key: &str) -> Result<Value, ToolError> {
        let started = Instant::now();
        let result = self.perform(call, api_key).await.map_err(|mut err| {
            err.details = redact_text(&err.details, usize::MAX, &[api_key]);
            err
        });
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let meta = request_log_meta(call, &result, elapsed_ms);
        match &result {
            Ok(_) => self.logger.debug("request completed", Some(&meta)),
            Err(_) => self.logger.warn("request failed", Some(&meta)),
        }
        result.map(|(_, payload)| payload)
    }
}
