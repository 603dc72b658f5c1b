//! Operation descriptors: the static table mapping each tool name to the
//! upstream REST call it performs.

mod table;

pub use table::operations;

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        }
    }
}

/// Where a validated parameter ends up in the outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Path,
    Query,
    Body,
    /// Body field whose upstream name differs from the public one.
    BodyAs(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    NonEmpty,
    /// Positive integer, optionally capped.
    PositiveInt { max: Option<i64> },
    OneOf(&'static [&'static str]),
    /// Exactly one Unicode scalar value.
    SingleChar,
    MinItems(usize),
    ItemKind(ParamKind),
    ItemFields(&'static [&'static str]),
    ItemOneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub location: Location,
    pub rules: &'static [Rule],
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, location: Location) -> Self {
        Self {
            name,
            kind,
            required: true,
            location,
            rules: &[],
            description: "",
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, location: Location) -> Self {
        Self {
            name,
            kind,
            required: false,
            location,
            rules: &[],
            description: "",
        }
    }

    pub const fn rules(mut self, rules: &'static [Rule]) -> Self {
        self.rules = rules;
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Human-readable shape used in validation diagnostics and tool schemas.
    pub fn expected_shape(&self) -> String {
        let mut shape = self.kind.as_str().to_string();
        let mut notes = Vec::new();
        for rule in self.rules {
            match rule {
                Rule::NonEmpty => notes.push("non-empty".to_string()),
                Rule::PositiveInt { max: Some(max) } => notes.push(format!("1..={}", max)),
                Rule::PositiveInt { max: None } => notes.push("positive".to_string()),
                Rule::OneOf(options) => notes.push(format!("one of: {}", options.join(", "))),
                Rule::SingleChar => notes.push("exactly one character".to_string()),
                Rule::MinItems(min) => notes.push(format!("at least {} item(s)", min)),
                Rule::ItemKind(kind) => shape = format!("array of {}", kind.as_str()),
                Rule::ItemFields(fields) => notes.push(format!("items with: {}", fields.join(", "))),
                Rule::ItemOneOf(options) => {
                    notes.push(format!("items one of: {}", options.join(", ")))
                }
            }
        }
        if notes.is_empty() {
            shape
        } else {
            format!("{} ({})", shape, notes.join("; "))
        }
    }
}

/// How validated body parameters are assembled into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    None,
    /// Body-located params as a JSON object.
    Object,
    /// The named param's value is sent as the whole body.
    Bare(&'static str),
    /// The named array param is sent as a bare array of `{key: item}` objects.
    BareWrapped { param: &'static str, key: &'static str },
    /// Body-located params nested under a single key.
    Nested(&'static str),
}

/// Renames a field inside every object item of an array param.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRename {
    pub param: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Workflow,
    Execution,
    Credential,
    User,
    Project,
    Tag,
    Variable,
    Audit,
    SourceControl,
}

#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub group: Group,
    pub description: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub params: &'static [ParamSpec],
    pub body: BodyShape,
    pub renames: &'static [ItemRename],
}

impl Operation {
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|spec| spec.name == name)
    }

    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|spec| spec.name.to_string()).collect()
    }

    /// Placeholder names in the path template, in order.
    pub fn path_placeholders(&self) -> Vec<&'static str> {
        self.path
            .split('/')
            .filter_map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
            })
            .collect()
    }
}

static OPERATION_INDEX: Lazy<HashMap<&'static str, &'static Operation>> =
    Lazy::new(|| operations().iter().map(|op| (op.name, op)).collect());

pub fn find_operation(name: &str) -> Option<&'static Operation> {
    OPERATION_INDEX.get(name).copied()
}

pub fn operation_names() -> Vec<String> {
    operations().iter().map(|op| op.name.to_string()).collect()
}
