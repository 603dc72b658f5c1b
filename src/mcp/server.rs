use crate::app::App;
use crate::config::Config;
use crate::errors::{McpError, McpErrorCode, ToolError};
use crate::mcp::catalog::tools_list;
use crate::mcp::envelope::{error_envelope, success_envelope};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use crate::services::logger::Logger;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "n8n-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct McpServer {
    app: App,
    logger: Logger,
}

impl McpServer {
    pub fn new(app: App) -> Self {
        let logger = app.logger.child("server");
        Self { app, logger }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
        })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let params: ToolCallParams = if params.is_null() {
            ToolCallParams::default()
        } else {
            serde_json::from_value(params).map_err(|err| {
                McpError::new(
                    McpErrorCode::InvalidParams,
                    format!("Invalid tools/call params: {}", err),
                )
            })?
        };
        let name = params.name.trim();
        if name.is_empty() {
            return Err(McpError::new(McpErrorCode::InvalidParams, "Missing tool name"));
        }
        let result = self
            .app
            .tool_executor
            .execute(name, params.arguments.clone(), params.headers())
            .await;
        Ok(match result {
            Ok(payload) => success_envelope(&payload),
            Err(err) => error_envelope(&err),
        })
    }

    /// Handles one inbound line; `None` means nothing should be written back.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let parsed: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    McpError::new(McpErrorCode::ParseError, "Parse error"),
                ))
            }
        };
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    McpError::new(McpErrorCode::InvalidRequest, "Invalid request"),
                ))
            }
        };

        if request.method.starts_with("notifications/") || request.is_notification() {
            self.logger.debug("notification", Some(&serde_json::json!({ "method": request.method })));
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list()),
            "tools/call" => match self.handle_tools_call(request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::failure(id, err),
            },
            _ => JsonRpcResponse::failure(
                id,
                McpError::new(McpErrorCode::MethodNotFound, "Method not found"),
            ),
        };
        Some(response)
    }

    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut writer = BufWriter::new(writer);
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(trimmed).await {
                let payload = serde_json::to_string(&response).unwrap_or_default();
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        self.logger.info(
            "listening on stdio",
            Some(&serde_json::json!({
                "api_url": self.app.config.api_url.as_str(),
                "timeout_ms": self.app.config.timeout_ms,
                "default_key": self.app.config.api_key.is_some(),
            })),
        );
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

pub async fn run_stdio(config: Config) -> Result<(), ToolError> {
    let app = App::initialize(config)?;
    McpServer::new(app).run_stdio().await
}
