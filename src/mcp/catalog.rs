use crate::operations::{operations, HttpMethod, Operation, ParamKind, ParamSpec, Rule};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    pub annotations: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> =
    Lazy::new(|| operations().iter().map(tool_def).collect());

pub fn tool_catalog() -> &'static [ToolDef] {
    &TOOL_CATALOG
}

pub fn tools_list() -> Value {
    serde_json::json!({ "tools": tool_catalog() })
}

fn tool_def(operation: &Operation) -> ToolDef {
    ToolDef {
        name: operation.name.to_string(),
        description: format!(
            "{} ({} {})",
            operation.description, operation.method, operation.path
        ),
        input_schema: input_schema(operation),
        annotations: serde_json::json!({
            "readOnlyHint": operation.method == HttpMethod::Get,
            "destructiveHint": operation.method == HttpMethod::Delete,
        }),
    }
}

fn input_schema(operation: &Operation) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for spec in operation.params {
        properties.insert(spec.name.to_string(), param_schema(spec));
        if spec.required {
            required.push(Value::String(spec.name.to_string()));
        }
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn param_schema(spec: &ParamSpec) -> Value {
    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::from(spec.kind.as_str()));
    if !spec.description.is_empty() {
        schema.insert("description".to_string(), Value::from(spec.description));
    }
    let mut items = Map::new();
    for rule in spec.rules {
        match rule {
            Rule::NonEmpty => {
                schema.insert("minLength".to_string(), Value::from(1));
            }
            Rule::PositiveInt { max } => {
                schema.insert("minimum".to_string(), Value::from(1));
                if let Some(max) = max {
                    schema.insert("maximum".to_string(), Value::from(*max));
                }
            }
            Rule::OneOf(options) => {
                schema.insert("enum".to_string(), Value::from(options.to_vec()));
            }
            Rule::SingleChar => {
                schema.insert("minLength".to_string(), Value::from(1));
                schema.insert("maxLength".to_string(), Value::from(1));
            }
            Rule::MinItems(min) => {
                schema.insert("minItems".to_string(), Value::from(*min));
            }
            Rule::ItemKind(kind) => {
                items.insert("type".to_string(), Value::from(kind.as_str()));
            }
            Rule::ItemFields(fields) => {
                items.insert("type".to_string(), Value::from(ParamKind::Object.as_str()));
                items.insert("required".to_string(), Value::from(fields.to_vec()));
            }
            Rule::ItemOneOf(options) => {
                items.insert("enum".to_string(), Value::from(options.to_vec()));
            }
        }
    }
    if spec.kind == ParamKind::Array && !items.is_empty() {
        schema.insert("items".to_string(), Value::Object(items));
    }
    Value::Object(schema)
}
