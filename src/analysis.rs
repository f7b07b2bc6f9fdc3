//! Prompt-injection analysis of discovered capabilities
//!
//! Each item is posted to an external analysis service. Its reply is parsed
//! best-effort; anything unexpected becomes an [`AnalysisError`] for that
//! item only.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::mcp::enumerator::{CapabilityItem, Category};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP request failed: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("failed to read response: {0}")]
    ReadBody(#[source] reqwest::Error),
    #[error("failed to parse response: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("{0}")]
    Reported(String),
    #[error("invalid detection result")]
    InvalidDetection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InjectionVerdict {
    pub is_injection: bool,
    pub confidence: f64,
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeVerdict {
    pub is_code: bool,
    pub confidence: f64,
    pub reason: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisVerdict {
    pub injection: InjectionVerdict,
    pub code: Option<CodeVerdict>,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        item: &CapabilityItem,
        category: Category,
    ) -> Result<AnalysisVerdict, AnalysisError>;
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Analyzer backed by the HTTP analysis service.
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    http: Client,
    endpoint: Url,
}

impl HttpAnalyzer {
    pub fn new(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(
        &self,
        item: &CapabilityItem,
        category: Category,
    ) -> Result<AnalysisVerdict, AnalysisError> {
        let request = AnalysisRequest {
            name: &item.name,
            description: &item.description,
            kind: category.item_kind(),
        };
        debug!(name = %item.name, kind = request.kind, endpoint = %self.endpoint, "requesting analysis");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(AnalysisError::Unreachable)?;
        let body = response.text().await.map_err(AnalysisError::ReadBody)?;
        debug!(name = %item.name, body = %body, "received analysis");

        let reply: Value = serde_json::from_str(&body).map_err(AnalysisError::Parse)?;
        parse_verdict(&reply)
    }
}

pub fn parse_verdict(reply: &Value) -> Result<AnalysisVerdict, AnalysisError> {
    if let Some(error) = reply.get("error") {
        let message = match error {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Err(AnalysisError::Reported(message));
    }

    let detection = reply
        .get("detection")
        .filter(|value| value.is_object())
        .ok_or(AnalysisError::InvalidDetection)?;

    let injection = InjectionVerdict {
        is_injection: bool_field(detection, "is_injection"),
        confidence: f64_field(detection, "confidence"),
        risk_level: detection
            .get("risk_level")
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    let code = reply
        .get("code_detection")
        .filter(|value| value.is_object())
        .map(|code| CodeVerdict {
            is_code: bool_field(code, "is_code"),
            confidence: f64_field(code, "confidence"),
            reason: str_field(code, "reason"),
            pattern: str_field(code, "pattern"),
        });

    Ok(AnalysisVerdict { injection, code })
}

fn bool_field(object: &Value, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn f64_field(object: &Value, key: &str) -> f64 {
    object.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn str_field(object: &Value, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
