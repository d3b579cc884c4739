//! Agenda MCP - clinic scheduling API bridged into MCP tools
//!
//! This library exposes the core components for the bridge server,
//! enabling integration tests and potential embedding in other applications.

pub mod arguments;
pub mod config;
pub mod error;
pub mod handlers;
pub mod projection;
pub mod registry;
pub mod remote;
pub mod service;
pub mod tools;

// Re-export key types for convenience
pub use config::{Config, ToolSource};
pub use error::{BridgeError, InvokeError, Result};
pub use handlers::health_handler;
pub use registry::{ToolHandler, ToolRegistry};
pub use remote::ApiClient;
pub use service::BridgeService;
