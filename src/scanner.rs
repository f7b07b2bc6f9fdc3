//! Scan orchestration
//!
//! `Idle -> Handshaking -> Enumerating(tools|prompts|resources) -> Done`, with
//! `Failed` reachable only while handshaking or when the shared deadline
//! expires. Listings never fail the scan; they degrade to empty results.

use std::{fmt, time::Duration};

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::{parse_target_url, Config},
    errors::ScanError,
    mcp::{
        enumerator::{self, CapabilityItem, Category},
        handshake,
        session::Session,
        transport::HttpTransport,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Handshaking,
    Enumerating(Category),
    Done,
    Failed,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Handshaking => f.write_str("handshaking"),
            Self::Enumerating(category) => write!(f, "enumerating {category}"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub tools: Vec<CapabilityItem>,
    pub prompts: Vec<CapabilityItem>,
    pub resources: Vec<CapabilityItem>,
}

impl ScanResult {
    pub fn items(&self, category: Category) -> &[CapabilityItem] {
        match category {
            Category::Tools => &self.tools,
            Category::Prompts => &self.prompts,
            Category::Resources => &self.resources,
        }
    }

    fn set(&mut self, category: Category, items: Vec<CapabilityItem>) {
        match category {
            Category::Tools => self.tools = items,
            Category::Prompts => self.prompts = items,
            Category::Resources => self.resources = items,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.items(*category).is_empty())
    }
}

/// Runs scans against MCP endpoints. Every call to [`Scanner::scan`] uses a
/// fresh [`Session`], so one scanner can serve concurrent scans.
#[derive(Debug, Clone)]
pub struct Scanner {
    http: Client,
    transport: HttpTransport,
    deadline: Duration,
}

impl Scanner {
    pub fn new(config: &Config) -> Result<Self, ScanError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ScanError::HttpClient)?;
        Ok(Self::with_client(http, config.scan_timeout))
    }

    pub fn with_client(http: Client, deadline: Duration) -> Self {
        Self {
            transport: HttpTransport::new(http.clone()),
            http,
            deadline,
        }
    }

    /// The HTTP client shared with collaborators such as the analyzer.
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    pub async fn scan(&self, target: &str) -> Result<ScanResult, ScanError> {
        let url = parse_target_url(target)?;
        info!(url = %url, "connecting to MCP server");

        let session = Session::new();
        let mut phase = ScanPhase::Idle;
        let outcome =
            tokio::time::timeout(self.deadline, self.run(&session, &url, &mut phase)).await;

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    tools = result.tools.len(),
                    prompts = result.prompts.len(),
                    resources = result.resources.len(),
                    "scan complete"
                );
                Ok(result)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                warn!(phase = %phase, deadline = ?self.deadline, "scan deadline exceeded");
                Err(ScanError::Timeout {
                    deadline: self.deadline,
                })
            }
        }
    }

    async fn run(
        &self,
        session: &Session,
        url: &Url,
        phase: &mut ScanPhase,
    ) -> Result<ScanResult, ScanError> {
        transition(phase, ScanPhase::Handshaking);
        if let Err(err) = handshake::perform(&self.transport, session, url).await {
            transition(phase, ScanPhase::Failed);
            return Err(err.into());
        }

        let mut result = ScanResult::default();
        for category in Category::ALL {
            transition(phase, ScanPhase::Enumerating(category));
            let listing = enumerator::list(&self.transport, session, url, category).await;
            result.set(category, listing.into_items());
        }

        transition(phase, ScanPhase::Done);
        Ok(result)
    }
}

fn transition(phase: &mut ScanPhase, next: ScanPhase) {
    debug!(from = %phase, to = %next, "scan phase");
    *phase = next;
}
