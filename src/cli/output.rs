//! Output formatting for discovery and matching results
//!
//! Formatters for machine-readable JSON and human-readable text. Both render
//! the same data; the text form adds summaries a reader wants at a glance.
//!
//! # Example
//!
//! ```ignore
//! use perfmap::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let report = formatter.format_discovery(&endpoints)?;
//! println!("{}", report);
//! ```

use anyhow::{Context, Result};

use crate::model::{DiscoveredEndpoint, MatchStatus, MatchingResult, RiskLevel};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Text,
}

/// Renders discovery and matching results in the configured format.
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the endpoints found by a discovery run.
    pub fn format_discovery(&self, endpoints: &[DiscoveredEndpoint]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(endpoints)
                .context("Failed to serialize discovered endpoints to JSON"),
            OutputFormat::Text => Ok(self.discovery_text(endpoints)),
        }
    }

    /// Formats the outcome of a matching run.
    pub fn format_matching(&self, result: &MatchingResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result)
                .context("Failed to serialize matching result to JSON"),
            OutputFormat::Text => Ok(self.matching_text(result)),
        }
    }

    fn discovery_text(&self, endpoints: &[DiscoveredEndpoint]) -> String {
        let mut output = String::new();

        if endpoints.is_empty() {
            output.push_str("\u{26A0} Endpoint Discovery Result\n");
            output.push_str(&rule());
            output.push_str("\nNo endpoints discovered.\n");
            return output;
        }

        output.push_str("\u{2713} Endpoint Discovery Result\n");
        output.push_str(&rule());
        output.push_str(&format!("\nEndpoints: {}\n\n", endpoints.len()));

        for endpoint in endpoints {
            output.push_str(&format!("{}\n", endpoint.endpoint));
            output.push_str(&format!(
                "\u{251C}\u{2500} Source:      {}:{} ({})\n",
                endpoint.file_path, endpoint.line_number, endpoint.function_name
            ));
            output.push_str(&format!(
                "\u{251C}\u{2500} Framework:   {}\n",
                endpoint.framework
            ));
            output.push_str(&format!(
                "\u{251C}\u{2500} Complexity:  {:.1}\n",
                endpoint.complexity_score
            ));
            output.push_str(&format!(
                "\u{2514}\u{2500} Risk:        {}\n\n",
                risk_with_tags(endpoint)
            ));
        }

        let high = count_risk(endpoints, RiskLevel::High);
        let medium = count_risk(endpoints, RiskLevel::Medium);
        let low = count_risk(endpoints, RiskLevel::Low);
        output.push_str(&format!(
            "Risk Summary: {} high, {} medium, {} low\n",
            high, medium, low
        ));

        output
    }

    fn matching_text(&self, result: &MatchingResult) -> String {
        let mut output = String::new();

        if result.status == MatchStatus::FullMatches {
            output.push_str("\u{2713} Performance Matching Result\n");
        } else {
            output.push_str("\u{26A0} Performance Matching Result\n");
        }
        output.push_str(&rule());
        output.push_str(&format!(
            "\nStatus: {} ({}/{} profiles matched)\n\n",
            result.status,
            result.matched_count(),
            result.total_profiles()
        ));

        for entry in &result.matches {
            output.push_str(&format!("{}\n", entry.performance_endpoint));
            match &entry.discovered_endpoint {
                Some(endpoint) => {
                    output.push_str(&format!(
                        "\u{251C}\u{2500} Matched:     {} ({}:{} in {})\n",
                        endpoint.endpoint,
                        endpoint.file_path,
                        endpoint.line_number,
                        endpoint.function_name
                    ));
                    output.push_str(&format!(
                        "\u{251C}\u{2500} Confidence:  {}\n",
                        confidence_bar(entry.confidence)
                    ));
                    output.push_str(&format!(
                        "\u{2514}\u{2500} Risk:        {}\n\n",
                        risk_with_tags(endpoint)
                    ));
                }
                None => {
                    output
                        .push_str("\u{251C}\u{2500} Matched:     (no candidate above threshold)\n");
                    output.push_str(&format!(
                        "\u{2514}\u{2500} Confidence:  {}\n\n",
                        confidence_bar(entry.confidence)
                    ));
                }
            }
        }

        if !result.unmatched_performance.is_empty() {
            output.push_str("Unmatched profiles:\n");
            for profile in &result.unmatched_performance {
                output.push_str(&format!("  - {}\n", profile));
            }
            output.push('\n');
        }

        if !result.unmatched_discovered.is_empty() {
            output.push_str("Unclaimed source endpoints:\n");
            for endpoint in &result.unmatched_discovered {
                output.push_str(&format!("  - {}\n", endpoint));
            }
        }

        output
    }
}

fn rule() -> String {
    "\u{2501}".repeat(42)
}

fn count_risk(endpoints: &[DiscoveredEndpoint], level: RiskLevel) -> usize {
    endpoints.iter().filter(|e| e.risk_level == level).count()
}

fn risk_with_tags(endpoint: &DiscoveredEndpoint) -> String {
    if endpoint.issue_tags.is_empty() {
        endpoint.risk_level.to_string()
    } else {
        let tags: Vec<&str> = endpoint.issue_tags.iter().map(|t| t.as_str()).collect();
        format!("{} [{}]", endpoint.risk_level, tags.join(", "))
    }
}

/// Ten-block bar plus a percentage, e.g. `█████████░ 92%`.
fn confidence_bar(confidence: f64) -> String {
    let filled = ((confidence * 10.0) as usize).min(10);
    format!(
        "{}{} {}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(10 - filled),
        (confidence * 100.0) as u8
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueTag, MatchResult, PerformanceProfile};
    use std::collections::BTreeSet;

    fn sample_endpoint() -> DiscoveredEndpoint {
        let mut endpoint = DiscoveredEndpoint::new("GET /api/users", "src/api/users.py", 12)
            .with_function("list_users")
            .with_framework("FastAPI");
        endpoint.complexity_score = 4.2;
        endpoint.issue_tags = BTreeSet::from([IssueTag::NoCaching, IssueTag::NoValidation]);
        endpoint.risk_level = RiskLevel::Medium;
        endpoint
    }

    fn sample_result() -> MatchingResult {
        MatchingResult {
            status: MatchStatus::PartialMatches,
            matches: vec![
                MatchResult::matched("GET /api/users", sample_endpoint(), 0.92),
                MatchResult::unmatched("GET /admin/stats", 0.34),
            ],
            unmatched_performance: vec![PerformanceProfile::new("GET /admin/stats")],
            unmatched_discovered: vec![DiscoveredEndpoint::new(
                "DELETE /api/users/{id}",
                "src/api/users.py",
                40,
            )],
        }
    }

    #[test]
    fn test_json_discovery_round_trips() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_discovery(&[sample_endpoint()]).unwrap();

        let parsed: Vec<DiscoveredEndpoint> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].endpoint, "GET /api/users");
        assert!(output.contains("no_caching"));
    }

    #[test]
    fn test_text_discovery_lists_each_endpoint() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_discovery(&[sample_endpoint()]).unwrap();

        assert!(output.contains("GET /api/users"));
        assert!(output.contains("src/api/users.py:12 (list_users)"));
        assert!(output.contains("FastAPI"));
        assert!(output.contains("4.2"));
        assert!(output.contains("MEDIUM [no_caching, no_validation]"));
        assert!(output.contains("Risk Summary: 0 high, 1 medium, 0 low"));
    }

    #[test]
    fn test_text_discovery_empty() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_discovery(&[]).unwrap();
        assert!(output.contains("No endpoints discovered"));
    }

    #[test]
    fn test_json_matching_round_trips() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_matching(&sample_result()).unwrap();

        let parsed: MatchingResult = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.status, MatchStatus::PartialMatches);
        assert_eq!(parsed.matches.len(), 2);
        assert!(output.contains("partial_matches"));
    }

    #[test]
    fn test_text_matching_shows_summary_and_leftovers() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_matching(&sample_result()).unwrap();

        assert!(output.contains("partial_matches"));
        assert!(output.contains("1/2 profiles matched"));
        assert!(output.contains("92%"));
        assert!(output.contains("no candidate above threshold"));
        assert!(output.contains("Unmatched profiles:"));
        assert!(output.contains("Unclaimed source endpoints:"));
        assert!(output.contains("DELETE /api/users/{id}"));
    }

    #[test]
    fn test_confidence_bar_bounds() {
        assert!(confidence_bar(0.0).ends_with("0%"));
        assert!(confidence_bar(1.0).ends_with("100%"));
        assert_eq!(confidence_bar(1.0).matches('\u{2588}').count(), 10);
        assert_eq!(confidence_bar(0.0).matches('\u{2591}').count(), 10);
    }
}
