//! Human-readable scan report with per-item analysis verdicts.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    analysis::{AnalysisError, AnalysisVerdict, Analyzer},
    mcp::enumerator::{CapabilityItem, Category},
    scanner::ScanResult,
};

#[derive(Debug)]
pub struct AnalyzedItem {
    pub item: CapabilityItem,
    pub analysis: Result<AnalysisVerdict, AnalysisError>,
}

#[derive(Debug)]
pub struct Report {
    pub target: String,
    pub scanned_at: DateTime<Utc>,
    pub sections: Vec<(Category, Vec<AnalyzedItem>)>,
}

impl Report {
    /// Analyzes every item in category order. A failed analysis is kept on
    /// the item and does not stop the remaining ones.
    pub async fn build(target: &str, result: &ScanResult, analyzer: &dyn Analyzer) -> Self {
        let mut sections = Vec::new();
        for category in Category::ALL {
            let mut analyzed = Vec::new();
            for item in result.items(category) {
                let analysis = analyzer.analyze(item, category).await;
                if let Err(err) = &analysis {
                    tracing::warn!(category = %category, name = %item.name, error = %err, "analysis failed");
                }
                analyzed.push(AnalyzedItem {
                    item: item.clone(),
                    analysis,
                });
            }
            sections.push((category, analyzed));
        }

        Self {
            target: target.to_string(),
            scanned_at: Utc::now(),
            sections,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|(_, items)| items.is_empty())
    }
}

fn heading(category: Category) -> &'static str {
    match category {
        Category::Tools => "📋 TOOLS:",
        Category::Prompts => "💬 PROMPTS:",
        Category::Resources => "📁 RESOURCES:",
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== MCP SERVER SCAN RESULTS WITH INJECTION DETECTION ===")?;
        writeln!(f, "Target: {}", self.target)?;
        writeln!(
            f,
            "Scanned at: {}",
            self.scanned_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;

        for (category, items) in &self.sections {
            if items.is_empty() {
                continue;
            }
            writeln!(f, "\n{}", heading(*category))?;
            for (index, analyzed) in items.iter().enumerate() {
                writeln!(f, "\n{}. {}", index + 1, analyzed.item.name)?;
                if let Some(uri) = &analyzed.item.uri {
                    writeln!(f, "   URI: {uri}")?;
                }
                writeln!(f, "   Description: {}", analyzed.item.description)?;
                write_analysis(f, &analyzed.analysis)?;
            }
        }

        if self.is_empty() {
            writeln!(f, "\n❌ No tools, prompts, or resources found.")?;
        }
        writeln!(f, "\n=== END SCAN ===")
    }
}

fn write_analysis(
    f: &mut fmt::Formatter<'_>,
    analysis: &Result<AnalysisVerdict, AnalysisError>,
) -> fmt::Result {
    let verdict = match analysis {
        Ok(verdict) => verdict,
        Err(err) => return writeln!(f, "     ⚠️  Analysis Error: {err}"),
    };

    let injection = &verdict.injection;
    if injection.is_injection {
        let risk = injection.risk_level.as_deref().unwrap_or_default();
        let marker = match risk {
            "MEDIUM" => "⚠️",
            _ => "🚨",
        };
        writeln!(
            f,
            "     {marker} INJECTION DETECTED (Confidence: {:.2}) - {risk} RISK",
            injection.confidence
        )?;
    } else {
        writeln!(
            f,
            "     ✅ NO INJECTION DETECTED (Confidence: {:.2})",
            injection.confidence
        )?;
    }

    match &verdict.code {
        Some(code) if code.is_code => writeln!(
            f,
            "     🔑 BANNED CODE/SECRET DETECTED (Confidence: {:.2}) - {} {}",
            code.confidence, code.reason, code.pattern
        ),
        Some(code) => writeln!(
            f,
            "     ✅ No banned code detected (Confidence: {:.2})",
            code.confidence
        ),
        None => Ok(()),
    }
}
