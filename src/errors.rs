use std::time::Duration;

use thiserror::Error;

use crate::{config::ConfigError, mcp::rpc::RpcError};

/// Failures of a single HTTP exchange with the MCP endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no data field found in SSE response")]
    MissingSseData,
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("malformed reply: neither result nor error present")]
    MalformedReply,
}

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("initialize request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("initialize error: {0}")]
    Rpc(RpcError),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to initialize MCP connection: {0}")]
    Handshake(#[from] HandshakeError),
    #[error("scan did not complete within {deadline:?}")]
    Timeout { deadline: Duration },
}

impl ScanError {
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
