//! In-process MCP endpoint used by the transport, handshake, enumerator and
//! scanner tests. Each test scripts the reply per JSON-RPC method and can
//! inspect every request the server received.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::post,
    Router,
};
use rust_mcp_sdk::{
    macros,
    schema::{
        Implementation, InitializeResult, ListToolsResult, ServerCapabilities,
        ServerCapabilitiesResources, ServerCapabilitiesTools,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::mcp::{handshake::PROTOCOL_VERSION, transport::SESSION_HEADER};

pub enum Reply {
    Json(Value),
    Sse(Value),
    Raw(String),
    Status(u16, &'static str),
    Accepted,
    Delayed(Duration, Value),
}

pub struct Scripted {
    reply: Reply,
    session_id: Option<String>,
}

impl Scripted {
    pub fn reply(reply: Reply) -> Self {
        Self {
            reply,
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub id: Option<i64>,
    pub session_id: Option<String>,
    pub accept: Option<String>,
    pub content_type: Option<String>,
}

type Script = Arc<dyn Fn(&str, Option<i64>) -> Scripted + Send + Sync>;

#[derive(Clone)]
struct MockState {
    script: Script,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct MockServer {
    endpoint: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockServer {
    pub async fn start<F>(script: F) -> Self
    where
        F: Fn(&str, Option<i64>) -> Scripted + Send + Sync + 'static,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            script: Arc::new(script),
            seen: Arc::clone(&seen),
        };
        let app = Router::new()
            .route("/mcp", post(handle))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service())
                .await
                .expect("mock server");
        });

        Self {
            endpoint: format!("http://{addr}/mcp"),
            seen,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn url(&self) -> Url {
        Url::parse(&self.endpoint).expect("mock endpoint url")
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("seen lock").clone()
    }

    pub fn seen_methods(&self) -> Vec<String> {
        self.seen().into_iter().map(|seen| seen.method).collect()
    }
}

async fn handle(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> Response {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let method = payload
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let id = payload.get("id").and_then(Value::as_i64);
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    state.seen.lock().expect("seen lock").push(SeenRequest {
        method: method.clone(),
        id,
        session_id: header_value(SESSION_HEADER),
        accept: header_value("accept"),
        content_type: header_value("content-type"),
    });

    let scripted = (state.script)(&method, id);
    let (status, content_type, body) = match scripted.reply {
        Reply::Json(value) => (200, Some("application/json"), value.to_string()),
        Reply::Sse(value) => (
            200,
            Some("text/event-stream"),
            format!("event: message\ndata: {value}\n\n"),
        ),
        Reply::Raw(text) => (200, Some("application/json"), text),
        Reply::Status(status, text) => (status, Some("text/plain"), text.to_string()),
        Reply::Accepted => (202, None, String::new()),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(delay).await;
            (200, Some("application/json"), value.to_string())
        }
    };

    let mut builder = axum::http::Response::builder()
        .status(StatusCode::from_u16(status).expect("valid status"));
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(session_id) = scripted.session_id {
        builder = builder.header(SESSION_HEADER, session_id);
    }
    builder.body(Body::from(body)).expect("mock response")
}

pub fn ok(id: Option<i64>, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

pub fn rpc_error(id: Option<i64>, code: i64, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
}

#[macros::mcp_tool(name = "echo", description = "Echoes input")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct EchoTool {
    pub message: String,
}

pub fn initialize_result() -> Value {
    let result = InitializeResult {
        server_info: Implementation {
            name: "mock-mcp-server".to_string(),
            version: "0.0.1".to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            resources: Some(ServerCapabilitiesResources {
                subscribe: Some(false),
                list_changed: Some(false),
            }),
            prompts: None,
            ..Default::default()
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        instructions: None,
        meta: None,
    };
    serde_json::to_value(result).expect("initialize result serialization")
}

pub fn echo_tools() -> Value {
    serde_json::to_value(ListToolsResult {
        meta: None,
        next_cursor: None,
        tools: vec![EchoTool::tool()],
    })
    .expect("tools list result serialization")
}

/// A well-behaved server: one `echo` tool, one prompt, one resource.
pub fn healthy(method: &str, id: Option<i64>) -> Scripted {
    match method {
        "initialize" => Scripted::reply(Reply::Json(ok(id, initialize_result()))),
        "notifications/initialized" => Scripted::reply(Reply::Accepted),
        "tools/list" => Scripted::reply(Reply::Json(ok(id, echo_tools()))),
        "prompts/list" => Scripted::reply(Reply::Json(ok(
            id,
            json!({"prompts": [{
                "name": "summarize",
                "description": "Summarize a document",
                "arguments": [{"name": "text", "required": true}]
            }]}),
        ))),
        "resources/list" => Scripted::reply(Reply::Json(ok(
            id,
            json!({"resources": [{
                "uri": "file:///etc/motd",
                "name": "motd",
                "description": "Message of the day",
                "mimeType": "text/plain"
            }]}),
        ))),
        _ => Scripted::reply(Reply::Json(rpc_error(id, -32601, "Method not found"))),
    }
}
