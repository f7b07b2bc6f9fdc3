//! Per-category capability listing with failure isolation
//!
//! Each category is fetched with its own `*/list` call. Whatever goes wrong
//! for one category is reported as a [`Listing::Failed`] and never reaches
//! the other categories.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::errors::TransportError;
use crate::mcp::{
    rpc::{JsonRpcRequest, RpcError},
    session::Session,
    transport::HttpTransport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tools,
    Prompts,
    Resources,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Tools, Category::Prompts, Category::Resources];

    pub fn method(self) -> &'static str {
        match self {
            Self::Tools => "tools/list",
            Self::Prompts => "prompts/list",
            Self::Resources => "resources/list",
        }
    }

    /// Name of the array member holding the items in the `*/list` result.
    pub fn result_field(self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Prompts => "prompts",
            Self::Resources => "resources",
        }
    }

    /// Singular item kind, as sent to the analysis service.
    pub fn item_kind(self) -> &'static str {
        match self {
            Self::Tools => "tool",
            Self::Prompts => "prompt",
            Self::Resources => "resource",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.result_field())
    }
}

/// Name/description projection of a tool, prompt or resource. `uri` is only
/// populated for resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityItem {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl CapabilityItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server returned error: {0}")]
    Rpc(RpcError),
    #[error("result has no `{0}` list")]
    MissingField(&'static str),
    #[error("failed to decode result: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Outcome of one category listing.
#[derive(Debug)]
pub enum Listing {
    Listed(Vec<CapabilityItem>),
    Failed(ListError),
}

impl Listing {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Items to report; a failed listing contributes none.
    pub fn into_items(self) -> Vec<CapabilityItem> {
        match self {
            Self::Listed(items) => items,
            Self::Failed(_) => Vec::new(),
        }
    }
}

/// Lists one category. Never fails: errors are logged and surface as
/// [`Listing::Failed`].
pub async fn list(
    transport: &HttpTransport,
    session: &Session,
    url: &Url,
    category: Category,
) -> Listing {
    match fetch(transport, session, url, category).await {
        Ok(items) => {
            info!(category = %category, count = items.len(), "retrieved capabilities");
            Listing::Listed(items)
        }
        Err(err) => {
            warn!(category = %category, error = %err, "failed to list capabilities");
            Listing::Failed(err)
        }
    }
}

async fn fetch(
    transport: &HttpTransport,
    session: &Session,
    url: &Url,
    category: Category,
) -> Result<Vec<CapabilityItem>, ListError> {
    let request = JsonRpcRequest::call(session.next_request_id(), category.method(), None);
    let response = transport.send(session, url, &request).await?;
    let result = response.into_result().map_err(ListError::Rpc)?;
    decode_items(category, result)
}

/// Projects a `*/list` result down to [`CapabilityItem`]s, dropping schemas,
/// argument lists, MIME types and any other extra members.
pub fn decode_items(category: Category, mut result: Value) -> Result<Vec<CapabilityItem>, ListError> {
    let field = category.result_field();
    let raw = result
        .get_mut(field)
        .map(Value::take)
        .ok_or(ListError::MissingField(field))?;
    let records: Vec<RawItem> = serde_json::from_value(raw).map_err(ListError::Decode)?;

    Ok(records
        .into_iter()
        .map(|record| CapabilityItem {
            name: record.name,
            description: record.description.unwrap_or_default(),
            uri: match category {
                Category::Resources => Some(record.uri.unwrap_or_default()),
                Category::Tools | Category::Prompts => None,
            },
        })
        .collect())
}
