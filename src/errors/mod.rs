mod mcp_error;
mod tool_error;

pub use mcp_error::{ErrorCode as McpErrorCode, McpError};
pub use tool_error::{ErrorCode, ToolError, ToolErrorKind};
