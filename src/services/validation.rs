use crate::constants::limits::SUGGESTION_LIMIT;
use crate::errors::ToolError;
use crate::operations::{Location, Operation, ParamKind, ParamSpec, Rule};
use crate::utils::suggest::suggest;
use crate::utils::text::truncate_chars;
use serde_json::{Map, Value};

const VALUE_PREVIEW_CHARS: usize = 200;

/// Checks raw tool arguments against an operation's parameter specs.
///
/// The returned map holds only declared parameters that were supplied with a
/// non-null value.
#[derive(Clone)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_params(
        &self,
        operation: &Operation,
        raw: &Value,
    ) -> Result<Map<String, Value>, ToolError> {
        let empty = Map::new();
        let args = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(ToolError::validation(format!(
                    "Parameters for {} must be an object",
                    operation.name
                ))
                .with_details(format!(
                    "Expected: object\nReceived: {} ({})",
                    json_type_name(other),
                    preview(other)
                )))
            }
        };

        let declared = operation.param_names();
        for key in args.keys() {
            if operation.param(key).is_none() {
                let suggestions = suggest(key, &declared, SUGGESTION_LIMIT);
                let mut details = format!(
                    "Operation {} does not accept '{}'.\nAccepted parameters: {}",
                    operation.name,
                    key,
                    declared.join(", ")
                );
                if !suggestions.is_empty() {
                    details.push_str(&format!("\nDid you mean: {}?", suggestions.join(", ")));
                }
                return Err(ToolError::validation(format!(
                    "Unknown parameter '{}' for {}",
                    key, operation.name
                ))
                .with_details(details));
            }
        }

        let mut validated = Map::new();
        for spec in operation.params {
            let value = args.get(spec.name).filter(|v| !v.is_null());
            let Some(value) = value else {
                if spec.required {
                    return Err(missing_error(operation, spec));
                }
                continue;
            };
            self.check_value(operation, spec, value)?;
            validated.insert(spec.name.to_string(), value.clone());
        }
        Ok(validated)
    }

    pub fn check_value(
        &self,
        operation: &Operation,
        spec: &ParamSpec,
        value: &Value,
    ) -> Result<(), ToolError> {
        if !matches_kind(spec.kind, value) {
            return Err(ToolError::validation(format!(
                "Invalid type for parameter '{}' of {}",
                spec.name, operation.name
            ))
            .with_details(format!(
                "Expected: {}\nReceived: {} ({})",
                spec.expected_shape(),
                json_type_name(value),
                preview(value)
            )));
        }
        if spec.required && spec.kind == ParamKind::String {
            if value.as_str().map(|s| s.trim().is_empty()).unwrap_or(false) {
                return Err(missing_error(operation, spec));
            }
        }
        if spec.location == Location::Path {
            if let Some(text) = value.as_str().map(str::trim) {
                if text == "." || text == ".." {
                    return Err(ToolError::validation(format!(
                        "Invalid value for parameter '{}' of {}",
                        spec.name, operation.name
                    ))
                    .with_details(format!(
                        "{} must be an identifier, not the path segment '{}'\nPath template: {}",
                        spec.name, text, operation.path
                    )));
                }
            }
        }
        for rule in spec.rules {
            if let Some(problem) = check_rule(rule, value) {
                return Err(ToolError::validation(format!(
                    "Invalid value for parameter '{}' of {}",
                    spec.name, operation.name
                ))
                .with_details(format!(
                    "{} {}\nExpected: {}\nReceived: {}",
                    spec.name,
                    problem,
                    spec.expected_shape(),
                    preview(value)
                )));
            }
        }
        Ok(())
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_error(operation: &Operation, spec: &ParamSpec) -> ToolError {
    ToolError::validation(format!(
        "Missing required parameter '{}' for {}",
        spec.name, operation.name
    ))
    .with_details(format!(
        "Parameter '{}' is required.\nExpected: {}\nExample: {{\"{}\": {}}}\nOperation: {} {} ({})",
        spec.name,
        spec.expected_shape(),
        spec.name,
        example_for(spec.kind),
        operation.method,
        operation.path,
        operation.name
    ))
}

fn example_for(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::String => "\"<string>\"",
        ParamKind::Integer => "1",
        ParamKind::Boolean => "true",
        ParamKind::Array => "[...]",
        ParamKind::Object => "{...}",
    }
}

fn matches_kind(kind: ParamKind, value: &Value) -> bool {
    match kind {
        ParamKind::String => value.is_string(),
        ParamKind::Integer => value.is_i64() || value.is_u64(),
        ParamKind::Boolean => value.is_boolean(),
        ParamKind::Array => value.is_array(),
        ParamKind::Object => value.is_object(),
    }
}

/// Returns a description of the violation, or `None` when the rule holds.
fn check_rule(rule: &Rule, value: &Value) -> Option<String> {
    match rule {
        Rule::NonEmpty => match value {
            Value::String(text) if text.trim().is_empty() => {
                Some("must be a non-empty string".to_string())
            }
            _ => None,
        },
        Rule::PositiveInt { max } => {
            let number = value.as_i64();
            match (number, max) {
                (Some(n), _) if n < 1 => Some("must be a positive integer".to_string()),
                (Some(n), Some(max)) if n > *max => {
                    Some(format!("must not exceed {}", max))
                }
                (None, _) => Some("must be a positive integer".to_string()),
                _ => None,
            }
        }
        Rule::OneOf(options) => match value.as_str() {
            Some(text) if options.contains(&text) => None,
            _ => Some(format!("must be one of: {}", options.join(", "))),
        },
        Rule::SingleChar => match value.as_str() {
            Some(text) if text.chars().count() == 1 => None,
            _ => Some("must be exactly one character".to_string()),
        },
        Rule::MinItems(min) => {
            let len = value.as_array().map(Vec::len).unwrap_or(0);
            if len < *min {
                Some(format!("must contain at least {} item(s)", min))
            } else {
                None
            }
        }
        Rule::ItemKind(kind) => value.as_array().and_then(|items| {
            items
                .iter()
                .position(|item| !matches_kind(*kind, item))
                .map(|idx| {
                    format!(
                        "item {} must be {} but is {}",
                        idx,
                        kind.as_str(),
                        json_type_name(&items[idx])
                    )
                })
        }),
        Rule::ItemFields(fields) => value.as_array().and_then(|items| {
            items.iter().enumerate().find_map(|(idx, item)| {
                let obj = item.as_object()?;
                fields
                    .iter()
                    .find(|field| obj.get(**field).map(Value::is_null).unwrap_or(true))
                    .map(|field| format!("item {} is missing field '{}'", idx, field))
            })
        }),
        Rule::ItemOneOf(options) => value.as_array().and_then(|items| {
            items.iter().enumerate().find_map(|(idx, item)| match item.as_str() {
                Some(text) if options.contains(&text) => None,
                _ => Some(format!(
                    "item {} must be one of: {}",
                    idx,
                    options.join(", ")
                )),
            })
        }),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn preview(value: &Value) -> String {
    truncate_chars(&value.to_string(), VALUE_PREVIEW_CHARS)
}
