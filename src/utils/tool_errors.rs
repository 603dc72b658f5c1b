use crate::constants::limits::SUGGESTION_LIMIT;
use crate::errors::{ErrorCode, ToolError, ToolErrorKind};
use crate::utils::suggest::suggest;

pub fn unknown_tool_error(tool: &str, known_tools: &[String]) -> ToolError {
    let suggestions = suggest(tool, known_tools, SUGGESTION_LIMIT);
    let mut lines = Vec::new();
    if !suggestions.is_empty() {
        lines.push(format!("Did you mean: {}?", suggestions.join(", ")));
    }
    lines.push(format!("Available tools: {}.", known_tools.join(", ")));

    ToolError::new(
        ToolErrorKind::Validation,
        ErrorCode::symbol(ErrorCode::UNKNOWN_TOOL),
        format!("Unknown tool: {}", tool),
    )
    .with_details(lines.join("\n"))
}
