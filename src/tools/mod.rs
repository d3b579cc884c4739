//! Registry assembly for both tool sources.

pub mod clinic;

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content};

use crate::arguments::ArgumentMap;
use crate::config::{Config, ToolSource};
use crate::error::{BridgeError, InvokeError, Result};
use crate::projection::{self, HttpMethod};
use crate::registry::{ToolHandler, ToolRegistry};
use crate::remote::{self, ApiClient};

/// Handler backing one projected operation: a single upstream call to the
/// operation's path with the tool's arguments.
struct RemoteOperation {
    api: ApiClient,
    method: HttpMethod,
    path: String,
}

#[async_trait]
impl ToolHandler for RemoteOperation {
    async fn call(&self, args: ArgumentMap) -> std::result::Result<CallToolResult, InvokeError> {
        let payload = self.api.execute(self.method, &self.path, &args).await?;
        Ok(CallToolResult::success(vec![Content::text(
            payload.to_string(),
        )]))
    }
}

/// Build the full tool registry for the configured source. Runs once at
/// startup; every failure here is fatal.
pub async fn build_registry(config: &Config, http: &reqwest::Client) -> Result<ToolRegistry> {
    if config.api_token.is_none() {
        tracing::warn!("API_TOKEN is not set, outbound calls will be unauthenticated");
    }

    let mut registry = ToolRegistry::new();

    match config.source {
        ToolSource::OpenApi => {
            let spec_url = config.spec_url.as_deref().ok_or_else(|| {
                BridgeError::Config(
                    "OPENAPI_SPEC_URL is required when TOOL_SOURCE is openapi".to_string(),
                )
            })?;

            let description = projection::fetch_description(http, spec_url).await?;
            let base_url = remote::resolve_base_url(
                config.api_url.as_deref(),
                description.server_url.as_deref(),
            );
            tracing::info!(base_url = %base_url, "resolved upstream base URL");
            let api = ApiClient::new(http.clone(), base_url, config.api_token.clone());

            let definitions = projection::project(&description.operations);
            for (definition, op) in definitions.into_iter().zip(description.operations) {
                registry.register(
                    definition,
                    Arc::new(RemoteOperation {
                        api: api.clone(),
                        method: op.method,
                        path: op.path,
                    }),
                )?;
            }

            if registry.is_empty() {
                tracing::warn!("API description contains no operations, serving an empty registry");
            }
        }
        ToolSource::Static => {
            let ids = clinic::ClinicIds::from_config(config)?;
            let base_url = remote::resolve_base_url(config.api_url.as_deref(), None);
            tracing::info!(base_url = %base_url, "resolved upstream base URL");
            let api = ApiClient::new(http.clone(), base_url, config.api_token.clone());
            clinic::register_clinic_tools(&mut registry, api, ids)?;
        }
    }

    tracing::info!(
        source = config.source.as_str(),
        tools = registry.len(),
        "tool registry ready"
    );
    tracing::debug!(names = ?registry.names(), "registered tools");

    Ok(registry)
}
