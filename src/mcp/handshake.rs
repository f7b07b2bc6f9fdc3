//! MCP lifecycle bootstrap: `initialize` followed by `notifications/initialized`.

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::errors::{HandshakeError, TransportError};
use crate::mcp::{rpc::JsonRpcRequest, session::Session, transport::HttpTransport};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const CLIENT_NAME: &str = env!("CARGO_PKG_NAME");
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: &'static str,
    pub capabilities: ClientCapabilities,
    pub client_info: ClientInfo,
}

/// The scanner declares no optional client features.
#[derive(Debug, Default, Serialize)]
pub struct ClientCapabilities {}

#[derive(Debug, Serialize)]
pub struct ClientInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl Default for InitializeParams {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ClientCapabilities::default(),
            client_info: ClientInfo {
                name: CLIENT_NAME,
                version: CLIENT_VERSION,
            },
        }
    }
}

/// Runs the handshake once per session. A failed `initialize` is fatal; a
/// failed `initialized` notification is only logged.
pub async fn perform(
    transport: &HttpTransport,
    session: &Session,
    url: &Url,
) -> Result<(), HandshakeError> {
    let params =
        serde_json::to_value(InitializeParams::default()).map_err(TransportError::Encode)?;
    let request = JsonRpcRequest::call(session.next_request_id(), "initialize", Some(params));

    let response = transport.send(session, url, &request).await?;
    let result = response.into_result().map_err(HandshakeError::Rpc)?;

    info!(
        protocol_version = result
            .get("protocolVersion")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown"),
        server = result
            .pointer("/serverInfo/name")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown"),
        "mcp session initialized"
    );

    let notification = JsonRpcRequest::notification("notifications/initialized");
    if let Err(err) = transport.notify(session, url, &notification).await {
        warn!(error = %err, "failed to send initialized notification");
    }

    Ok(())
}
