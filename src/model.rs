//! Shared data model for endpoint discovery and performance matching.
//!
//! All records are per-run and immutable once constructed; nothing here is
//! persisted by the core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Aggregated load-test metrics for a single endpoint, supplied by an
/// external analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub endpoint: String,
    #[serde(default)]
    pub avg_response_time_ms: f64,
    #[serde(default)]
    pub error_rate_percent: f64,
    #[serde(default)]
    pub throughput_rps: f64,
    #[serde(default)]
    pub p95_latency_ms: f64,
}

impl PerformanceProfile {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            avg_response_time_ms: 0.0,
            error_rate_percent: 0.0,
            throughput_rps: 0.0,
            p95_latency_ms: 0.0,
        }
    }

    pub fn with_latency(mut self, avg_ms: f64, p95_ms: f64) -> Self {
        self.avg_response_time_ms = avg_ms;
        self.p95_latency_ms = p95_ms;
        self
    }

    pub fn with_error_rate(mut self, percent: f64) -> Self {
        self.error_rate_percent = percent;
        self
    }

    pub fn with_throughput(mut self, rps: f64) -> Self {
        self.throughput_rps = rps;
        self
    }
}

impl fmt::Display for PerformanceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (avg {:.0}ms, p95 {:.0}ms, {:.1}% errors)",
            self.endpoint, self.avg_response_time_ms, self.p95_latency_ms, self.error_rate_percent
        )
    }
}

/// Shallow code-quality findings attached to a discovered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    NoCaching,
    NoErrorHandling,
    NoValidation,
    PotentialNPlusOneQuery,
    AsyncWithoutAwait,
}

impl IssueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueTag::NoCaching => "no_caching",
            IssueTag::NoErrorHandling => "no_error_handling",
            IssueTag::NoValidation => "no_validation",
            IssueTag::PotentialNPlusOneQuery => "potential_n_plus_one_query",
            IssueTag::AsyncWithoutAwait => "async_without_await",
        }
    }
}

impl fmt::Display for IssueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse classification of an endpoint's code-quality exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An endpoint found by static scanning, with file/line/function provenance
/// and static quality metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredEndpoint {
    /// HTTP method and path, e.g. `GET /api/users/{id}`.
    pub endpoint: String,
    pub file_path: String,
    pub function_name: String,
    pub framework: String,
    pub line_number: usize,
    pub code_excerpt: String,
    /// Branching-construct density of the enclosing function, in [0, 10].
    pub complexity_score: f64,
    pub issue_tags: BTreeSet<IssueTag>,
    pub risk_level: RiskLevel,
}

impl DiscoveredEndpoint {
    pub fn new(
        endpoint: impl Into<String>,
        file_path: impl Into<String>,
        line_number: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            file_path: file_path.into(),
            function_name: "unknown_function".to_string(),
            framework: "Unknown".to_string(),
            line_number,
            code_excerpt: String::new(),
            complexity_score: 0.0,
            issue_tags: BTreeSet::new(),
            risk_level: RiskLevel::Low,
        }
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    /// Key used to collapse duplicate discoveries of the same route.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.endpoint, self.file_path)
    }
}

impl fmt::Display for DiscoveredEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{} in {})",
            self.endpoint, self.file_path, self.line_number, self.function_name
        )
    }
}

/// Matching outcome for one performance profile. A profile whose best
/// candidate stayed below the threshold carries no discovered endpoint;
/// `confidence` still records the best score seen, so near-misses are
/// visible in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub performance_endpoint: String,
    pub discovered_endpoint: Option<DiscoveredEndpoint>,
    /// Combined confidence in [0, 1].
    pub confidence: f64,
}

impl MatchResult {
    pub fn matched(
        performance_endpoint: impl Into<String>,
        discovered: DiscoveredEndpoint,
        confidence: f64,
    ) -> Self {
        Self {
            performance_endpoint: performance_endpoint.into(),
            discovered_endpoint: Some(discovered),
            confidence,
        }
    }

    pub fn unmatched(performance_endpoint: impl Into<String>, best_confidence: f64) -> Self {
        Self {
            performance_endpoint: performance_endpoint.into(),
            discovered_endpoint: None,
            confidence: best_confidence,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.discovered_endpoint.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    NoMatches,
    PartialMatches,
    FullMatches,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::NoMatches => "no_matches",
            MatchStatus::PartialMatches => "partial_matches",
            MatchStatus::FullMatches => "full_matches",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of pairing a batch of performance profiles against discovered
/// endpoints.
///
/// `matches` carries one entry per input profile, in input order; entries
/// below the threshold have no discovered endpoint and their profiles are
/// also listed in `unmatched_performance`. Discovered endpoints are not
/// exclusive: several profiles may legitimately resolve to the same source
/// endpoint, so `unmatched_discovered` holds only endpoints no accepted
/// match selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub status: MatchStatus,
    pub matches: Vec<MatchResult>,
    pub unmatched_performance: Vec<PerformanceProfile>,
    pub unmatched_discovered: Vec<DiscoveredEndpoint>,
}

impl MatchingResult {
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_matched()).count()
    }

    pub fn total_profiles(&self) -> usize {
        self.matches.len()
    }
}

impl fmt::Display for MatchingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} profiles matched, {} source endpoints unclaimed",
            self.status,
            self.matched_count(),
            self.total_profiles(),
            self.unmatched_discovered.len()
        )
    }
}
