//! Scanner for MCP servers exposed over streamable HTTP.
//!
//! Connects to an endpoint, performs the MCP handshake, enumerates tools,
//! prompts and resources, and has each description checked for prompt
//! injection by an external analysis service.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod logging;
pub mod mcp;
pub mod report;
pub mod scanner;

#[cfg(test)]
mod test_support;

use analysis::HttpAnalyzer;
use config::Config;
use errors::ScanError;
use report::Report;
use scanner::Scanner;

/// Scans `target` and analyzes everything it exposes. Only configuration,
/// handshake and deadline failures are returned as errors.
pub async fn scan_and_analyze(config: &Config, target: &str) -> Result<Report, ScanError> {
    let scanner = Scanner::new(config)?;
    let result = scanner.scan(target).await?;
    let analyzer = HttpAnalyzer::new(scanner.http_client().clone(), config.analyzer_url.clone());
    Ok(Report::build(target, &result, &analyzer).await)
}
