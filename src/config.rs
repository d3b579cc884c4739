use std::env;

/// Where the bridge's tool set comes from.
/// Selected with the `TOOL_SOURCE` environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    /// Fetch a remote OpenAPI document and project one tool per operation.
    OpenApi,
    /// Declare the three fixed clinic tools with explicit schemas.
    Static,
}

impl ToolSource {
    pub fn from_env() -> Self {
        match env::var("TOOL_SOURCE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "static" | "fixed" | "clinic" => Self::Static,
            _ => Self::OpenApi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenApi => "openapi",
            Self::Static => "static",
        }
    }
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub source: ToolSource,
    /// URL of the OpenAPI document to project tools from (openapi source).
    pub spec_url: Option<String>,
    /// Base URL override for outbound calls; takes precedence over any
    /// server URL declared in the API description.
    pub api_url: Option<String>,
    /// Bearer token attached to every outbound call when set.
    pub api_token: Option<String>,
    /// Clinic identifiers used by the static tools. All four are required
    /// when `source` is `Static`; checked when the registry is built.
    pub place_id: Option<i64>,
    pub event_id: Option<i64>,
    pub account_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Insurance identifier; the upstream treats 1 as the private default.
    pub insurance_id: i64,
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// The `TOOL_SOURCE` environment variable selects the description source:
    /// - `openapi` (default): project tools from `OPENAPI_SPEC_URL`
    /// - `static` / `fixed` / `clinic`: the three fixed clinic tools
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            source: ToolSource::from_env(),
            spec_url: non_empty_var("OPENAPI_SPEC_URL"),
            api_url: non_empty_var("API_URL"),
            api_token: non_empty_var("API_TOKEN"),
            place_id: int_var("PLACE_ID")?,
            event_id: int_var("EVENT_ID")?,
            account_id: int_var("ACCOUNT_ID")?,
            user_id: int_var("USER_ID")?,
            insurance_id: int_var("INSURANCE_ID")?.unwrap_or(1),
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        })
    }
}

/// Read a string variable, treating empty values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read an integer variable. Set-but-unparseable is a hard error, not a
/// silent fallback.
fn int_var(name: &str) -> anyhow::Result<Option<i64>> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            let value = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("{} must be an integer, got {:?}", name, raw))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}
