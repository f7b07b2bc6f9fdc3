//! Streamable HTTP transport for MCP JSON-RPC exchanges
//!
//! Every call is a single `POST` to the endpoint. The server may answer with a
//! plain JSON body or with an SSE stream whose first `data:` line carries the
//! JSON payload; both are normalized before decoding.

use reqwest::{
    header::{HeaderMap, ACCEPT, CONTENT_TYPE},
    Client, RequestBuilder, Response,
};
use tracing::{debug, warn};
use url::Url;

use crate::errors::TransportError;
use crate::mcp::{
    rpc::{JsonRpcRequest, JsonRpcResponse},
    session::Session,
};

pub const SESSION_HEADER: &str = "mcp-session-id";
pub const ACCEPT_BOTH: &str = "application/json, text/event-stream";

const SSE_PREAMBLE: &str = "event:";
const SSE_DATA_PREFIX: &str = "data: ";
const BODY_SNIPPET_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Sends a call and decodes its reply. Any non-2xx status is fatal.
    pub async fn send(
        &self,
        session: &Session,
        url: &Url,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, TransportError> {
        debug!(method = %request.method, id = ?request.id, "sending mcp request");

        let response = self.post(session, url, request)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        capture_session_id(session, response.headers());
        let body = response.text().await?;
        debug!(method = %request.method, status = status.as_u16(), "received mcp response");

        let payload = normalize_body(&body)?;
        let decoded: JsonRpcResponse =
            serde_json::from_str(payload).map_err(TransportError::Decode)?;
        if !decoded.is_well_formed() {
            return Err(TransportError::MalformedReply);
        }
        Ok(decoded)
    }

    /// Fire-and-forget delivery. Error statuses are logged, never raised; only
    /// a failure to reach the server at all is returned.
    pub async fn notify(
        &self,
        session: &Session,
        url: &Url,
        notification: &JsonRpcRequest,
    ) -> Result<(), TransportError> {
        debug!(method = %notification.method, "sending mcp notification");

        let response = self.post(session, url, notification)?.send().await?;
        log_notification_status(&notification.method, response).await;
        Ok(())
    }

    fn post(
        &self,
        session: &Session,
        url: &Url,
        envelope: &JsonRpcRequest,
    ) -> Result<RequestBuilder, TransportError> {
        let body = serde_json::to_vec(envelope).map_err(TransportError::Encode)?;
        let mut builder = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_BOTH)
            .body(body);

        if let Some(session_id) = session.session_id() {
            builder = builder.header(SESSION_HEADER, session_id);
        }
        Ok(builder)
    }
}

async fn log_notification_status(method: &str, response: Response) {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        warn!(
            method = %method,
            status = status.as_u16(),
            body = %snippet(&body),
            "notification returned error status"
        );
    }
}

fn capture_session_id(session: &Session, headers: &HeaderMap) {
    let value = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(session_id) = value {
        session.record_session_id(session_id);
    }
}

/// Reduces a response body to its JSON payload.
///
/// Bodies opening with an SSE `event:` line yield the remainder of the first
/// `data: ` line; every other SSE field is ignored. Anything else is returned
/// unchanged.
pub fn normalize_body(body: &str) -> Result<&str, TransportError> {
    if !body.starts_with(SSE_PREAMBLE) {
        return Ok(body);
    }

    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(SSE_DATA_PREFIX))
        .ok_or(TransportError::MissingSseData)
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
