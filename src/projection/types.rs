//! Core types shared by the description sources and the projector.

use serde_json::{json, Map, Value};
use std::fmt;

/// HTTP methods the bridge projects tools for. Anything else in a
/// description (head, options, trace) is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Fixed traversal order for per-path operations. Keeps projected
    /// registries deterministic across runs regardless of how the parsed
    /// document stores its per-path operations.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    pub fn is_get(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One path and method pair extracted from an API description.
/// Immutable after load.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

/// Value kinds a declared tool parameter may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// One declared parameter of a static tool.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: false,
        }
    }
}

/// Parameter schema of a tool: either an open passthrough object (projected
/// tools forward whatever the caller supplies) or an explicit declaration
/// validated before dispatch.
#[derive(Debug, Clone)]
pub enum ParameterSchema {
    Open,
    Declared(Vec<ParamSpec>),
}

/// A tool derived from a described operation or declared statically.
/// Created once at startup and held for the process lifetime.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub params: ParameterSchema,
}

impl ToolDefinition {
    /// Render the parameter schema as the JSON-Schema object advertised in
    /// the MCP tool listing.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));

        match &self.params {
            ParameterSchema::Open => {
                schema.insert("properties".to_string(), json!({}));
            }
            ParameterSchema::Declared(specs) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for spec in specs {
                    properties.insert(
                        spec.name.clone(),
                        json!({
                            "type": spec.kind.as_str(),
                            "description": spec.description,
                        }),
                    );
                    if spec.required {
                        required.push(Value::String(spec.name.clone()));
                    }
                }
                schema.insert("properties".to_string(), Value::Object(properties));
                if !required.is_empty() {
                    schema.insert("required".to_string(), Value::Array(required));
                }
            }
        }

        schema
    }
}
