//! Loading and flattening OpenAPI documents.
//!
//! The description is fetched once at startup. Documents arrive as JSON or
//! YAML; both are parsed into the same typed model before the path table is
//! flattened into operation descriptors.

use openapiv3::{OpenAPI, Operation, PathItem};

use crate::error::{BridgeError, Result};
use crate::projection::types::{HttpMethod, OperationDescriptor};

/// Everything the bridge needs out of a parsed API description.
#[derive(Debug)]
pub struct ApiDescription {
    pub operations: Vec<OperationDescriptor>,
    /// First advertised server URL, if the document declares one.
    pub server_url: Option<String>,
}

/// Download and parse the description behind `url`. Non-2xx responses and
/// transport failures surface as fetch errors and abort startup.
pub async fn fetch_description(http: &reqwest::Client, url: &str) -> Result<ApiDescription> {
    tracing::info!(url = %url, "fetching API description");
    let body = http.get(url).send().await?.error_for_status()?.text().await?;
    parse_description(&body)
}

/// Parse a description from raw text, trying JSON first and YAML second.
pub fn parse_description(text: &str) -> Result<ApiDescription> {
    let document: OpenAPI = match serde_json::from_str(text) {
        Ok(document) => document,
        Err(json_err) => serde_yaml::from_str(text).map_err(|yaml_err| {
            BridgeError::DescriptionInvalid(format!(
                "not valid JSON ({json_err}) nor YAML ({yaml_err})"
            ))
        })?,
    };

    let server_url = document
        .servers
        .first()
        .map(|server| server.url.trim().to_string())
        .filter(|url| !url.is_empty());

    let operations = flatten_paths(&document);
    tracing::info!(
        operations = operations.len(),
        server = server_url.as_deref().unwrap_or("<none>"),
        "parsed API description"
    );

    Ok(ApiDescription { operations, server_url })
}

/// Walk the path table in document order, visiting each path's operations
/// in the fixed method order. Referenced path items cannot be resolved
/// without a component store, so they are skipped with a warning.
fn flatten_paths(document: &OpenAPI) -> Vec<OperationDescriptor> {
    let mut operations = Vec::new();

    for (path, item) in &document.paths.paths {
        let Some(item) = item.as_item() else {
            tracing::warn!(path = %path, "skipping referenced path item");
            continue;
        };

        for method in HttpMethod::ALL {
            if let Some(operation) = operation_for(item, method) {
                operations.push(OperationDescriptor {
                    path: path.clone(),
                    method,
                    operation_id: operation.operation_id.clone(),
                    summary: operation.summary.clone(),
                    description: operation.description.clone(),
                });
            }
        }
    }

    operations
}

fn operation_for(item: &PathItem, method: HttpMethod) -> Option<&Operation> {
    match method {
        HttpMethod::Get => item.get.as_ref(),
        HttpMethod::Post => item.post.as_ref(),
        HttpMethod::Put => item.put.as_ref(),
        HttpMethod::Delete => item.delete.as_ref(),
        HttpMethod::Patch => item.patch.as_ref(),
    }
}
