//! API description handling: loading documents and projecting their
//! operations into tool definitions.

pub mod openapi;
pub mod projector;
pub mod types;

pub use openapi::{fetch_description, parse_description, ApiDescription};
pub use projector::{project, sanitize_name, MAX_TOOL_NAME_LEN};
pub use types::{
    HttpMethod, OperationDescriptor, ParamKind, ParamSpec, ParameterSchema, ToolDefinition,
};
