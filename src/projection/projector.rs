//! Projection of operation descriptors into tool definitions.

use std::collections::HashSet;

use crate::projection::types::{OperationDescriptor, ParameterSchema, ToolDefinition};

/// Hard cap on projected tool names. Agent runtimes truncate or reject
/// longer identifiers.
pub const MAX_TOOL_NAME_LEN: usize = 60;

const FALLBACK_DESCRIPTION: &str = "No description provided.";

/// Restrict a candidate name to `[A-Za-z0-9_]`, replacing every other
/// character with `_`, and cap the length. Idempotent: sanitizing an
/// already-sanitized name returns it unchanged.
pub fn sanitize_name(candidate: &str) -> String {
    candidate
        .chars()
        .take(MAX_TOOL_NAME_LEN)
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn fallback_name(op: &OperationDescriptor) -> String {
    sanitize_name(&format!("{}_{}", op.method, op.path))
}

fn describe(op: &OperationDescriptor) -> String {
    op.summary
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .or_else(|| op.description.as_deref().filter(|text| !text.trim().is_empty()))
        .unwrap_or(FALLBACK_DESCRIPTION)
        .to_string()
}

/// Project descriptors into tool definitions, one per descriptor, in
/// input order. Names come from the operation id when one exists and is
/// still free; otherwise from the method and path. A name that collides
/// even after the fallback is left as is and rejected at registration.
pub fn project(operations: &[OperationDescriptor]) -> Vec<ToolDefinition> {
    let mut taken: HashSet<String> = HashSet::with_capacity(operations.len());
    let mut tools = Vec::with_capacity(operations.len());

    for op in operations {
        let name = match op.operation_id.as_deref() {
            Some(id) if !id.trim().is_empty() => {
                let sanitized = sanitize_name(id);
                if taken.contains(&sanitized) {
                    let fallback = fallback_name(op);
                    tracing::warn!(
                        operation_id = id,
                        fallback = %fallback,
                        "operation id already projected, using method and path"
                    );
                    fallback
                } else {
                    sanitized
                }
            }
            _ => fallback_name(op),
        };

        taken.insert(name.clone());
        tools.push(ToolDefinition {
            name,
            description: describe(op),
            params: ParameterSchema::Open,
        });
    }

    tools
}
