use crate::errors::ToolError;
use crate::operations::{find_operation, operation_names};
use crate::services::credentials::resolve_credential;
use crate::services::logger::Logger;
use crate::services::n8n_client::Transport;
use crate::services::translator::Translator;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Runs one tool call end to end: lookup, credential, translation, transport.
#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    translator: Translator,
    transport: Arc<dyn Transport>,
    default_api_key: Option<String>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        translator: Translator,
        transport: Arc<dyn Transport>,
        default_api_key: Option<String>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            translator,
            transport,
            default_api_key,
        }
    }

    pub async fn execute(
        &self,
        tool: &str,
        args: Value,
        headers: Option<&Map<String, Value>>,
    ) -> Result<Value, ToolError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let result = self.run(tool, &args, headers).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => self.logger.debug(
                "tool call succeeded",
                Some(&serde_json::json!({
                    "trace_id": trace_id,
                    "tool": tool,
                    "duration_ms": duration_ms,
                })),
            ),
            Err(err) => self.logger.warn(
                "tool call failed",
                Some(&serde_json::json!({
                    "trace_id": trace_id,
                    "tool": tool,
                    "kind": err.kind.as_str(),
                    "code": err.code,
                    "duration_ms": duration_ms,
                })),
            ),
        }
        result
    }

    async fn run(
        &self,
        tool: &str,
        args: &Value,
        headers: Option<&Map<String, Value>>,
    ) -> Result<Value, ToolError> {
        let operation = find_operation(tool)
            .ok_or_else(|| unknown_tool_error(tool, &operation_names()))?;

        let api_key = resolve_credential(headers, self.default_api_key.as_deref())
            .ok_or_else(|| {
                ToolError::missing_api_key("No n8n API key provided").with_details(
                    "Send the key in the X-N8N-API-KEY header (or X-API-Key, or \
                     Authorization: Bearer <key>), or set N8N_API_KEY for the server.",
                )
            })?;

        let call = self.translator.translate(operation, args)?;
        self.logger.debug(
            "dispatching",
            Some(&serde_json::json!({
                "tool": tool,
                "endpoint": call.endpoint(),
            })),
        );
        self.transport.execute(&call, &api_key).await
    }
}
