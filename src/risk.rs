//! Risk classification for discovered endpoints.
//!
//! Pure scoring: complexity plus a fixed weight per issue tag, split into
//! three bands. No I/O, no shared state, so the same inputs always produce
//! the same level.

use std::collections::BTreeSet;

use crate::model::{IssueTag, RiskLevel};

/// Score at or above which an endpoint is high risk.
const HIGH_THRESHOLD: f64 = 7.0;

/// Score at or above which an endpoint is medium risk.
const MEDIUM_THRESHOLD: f64 = 4.0;

/// Additional score contributed by one issue tag. Query amplification
/// dominates; the other tags are graded by how often they turn into
/// production incidents.
pub fn issue_weight(tag: IssueTag) -> f64 {
    match tag {
        IssueTag::PotentialNPlusOneQuery => 3.0,
        IssueTag::NoCaching => 2.0,
        IssueTag::NoErrorHandling => 2.0,
        IssueTag::NoValidation => 1.0,
        IssueTag::AsyncWithoutAwait => 1.0,
    }
}

/// Maps a complexity score and issue set to a risk level.
pub fn classify(complexity_score: f64, tags: &BTreeSet<IssueTag>) -> RiskLevel {
    let score: f64 = complexity_score + tags.iter().map(|t| issue_weight(*t)).sum::<f64>();
    if score >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
