use reqwest::StatusCode;
use thiserror::Error;

/// Errors that abort startup. Nothing in this enum is ever surfaced to an
/// agent client; the process logs the message and exits before serving.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to fetch API description: {0}")]
    DescriptionFetch(#[from] reqwest::Error),

    #[error("API description is not a valid OpenAPI document: {0}")]
    DescriptionInvalid(String),

    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
}

/// Per-invocation failures. These never escape the dispatcher: each one is
/// folded into a `CallToolResult` with the error flag set, so the transport
/// layer only ever sees a well-formed tool result.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("invalid arguments: {0}")]
    Arguments(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {detail}")]
    Upstream { status: StatusCode, detail: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
