//! Endpoint matching.
//!
//! Correlates performance profile endpoints against discovered endpoints.
//! Every profile is scored against every discovered endpoint with five
//! weighted strategies; the best-scoring candidate is accepted when it
//! reaches the caller's threshold. Matching is synchronous and pure: the
//! same inputs always produce the same result, and a discovered endpoint
//! may back any number of profiles.

pub mod normalize;
pub mod strategies;

pub use normalize::{NormalizedEndpoint, Normalizer};
pub use strategies::MatchStrategy;

use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::config::MatchWeights;
use crate::model::{
    DiscoveredEndpoint, MatchResult, MatchStatus, MatchingResult, PerformanceProfile,
};
use strategies::{
    ExactStrategy, FrameworkStrategy, FuzzyStrategy, PhraseStrategy, SemanticStrategy,
};

/// Cap applied when a meaningful profile is scored against a generic
/// discovered endpoint that shares none of its tokens.
const GENERIC_NO_OVERLAP_CAP: f64 = 0.2;

/// Cap applied when the generic discovered endpoint still shares a token
/// with the profile.
const GENERIC_OVERLAP_CAP: f64 = 0.5;

/// An exact-strategy score at or above this decides the match on its own.
const EXACT_DECISIVE: f64 = 0.9;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("match threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f64),
}

/// Per-strategy scores for one endpoint pair.
#[derive(Debug, Clone, Copy)]
pub struct ComponentScores {
    pub exact: f64,
    pub fuzzy: f64,
    pub phrase: f64,
    pub semantic: f64,
    pub framework: f64,
}

pub struct EndpointMatcher {
    normalizer: Normalizer,
    weights: MatchWeights,
    exact: ExactStrategy,
    fuzzy: FuzzyStrategy,
    phrase: PhraseStrategy,
    semantic: SemanticStrategy,
    framework: FrameworkStrategy,
}

impl EndpointMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_weights(MatchWeights::default())
    }

    pub fn with_weights(weights: MatchWeights) -> Result<Self, regex::Error> {
        Ok(Self {
            normalizer: Normalizer::new()?,
            weights,
            exact: ExactStrategy,
            fuzzy: FuzzyStrategy,
            phrase: PhraseStrategy,
            semantic: SemanticStrategy,
            framework: FrameworkStrategy::new()?,
        })
    }

    /// Matches every profile against the discovered endpoints.
    ///
    /// Each profile gets one `MatchResult`; profiles whose best candidate
    /// falls below `threshold` carry no discovered endpoint. Candidates
    /// are compared strictly, so equal scores resolve to the earliest
    /// discovered endpoint and repeated runs return identical results.
    pub fn match_endpoints(
        &self,
        profiles: &[PerformanceProfile],
        discovered: &[DiscoveredEndpoint],
        threshold: f64,
    ) -> Result<MatchingResult, MatchError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatchError::InvalidThreshold(threshold));
        }

        let candidates: Vec<NormalizedEndpoint> = discovered
            .iter()
            .map(|d| self.normalizer.discovered(d))
            .collect();

        let mut matches = Vec::with_capacity(profiles.len());
        let mut unmatched_performance = Vec::new();
        let mut accepted: HashSet<usize> = HashSet::new();

        for profile in profiles {
            let normalized = self.normalizer.profile(&profile.endpoint);
            let mut best: Option<(usize, f64)> = None;
            for (idx, candidate) in candidates.iter().enumerate() {
                let score = self.combine(&normalized, candidate);
                if best.map_or(true, |(_, current)| score > current) {
                    best = Some((idx, score));
                }
            }

            match best {
                Some((idx, score)) if score >= threshold => {
                    debug!(
                        profile = %profile.endpoint,
                        endpoint = %discovered[idx].endpoint,
                        confidence = score,
                        "matched endpoint"
                    );
                    accepted.insert(idx);
                    matches.push(MatchResult::matched(
                        profile.endpoint.clone(),
                        discovered[idx].clone(),
                        score,
                    ));
                }
                _ => {
                    debug!(profile = %profile.endpoint, "no endpoint above threshold");
                    unmatched_performance.push(profile.clone());
                    matches.push(MatchResult::unmatched(
                        profile.endpoint.clone(),
                        best.map(|(_, s)| s).unwrap_or(0.0),
                    ));
                }
            }
        }

        let unmatched_discovered: Vec<DiscoveredEndpoint> = discovered
            .iter()
            .enumerate()
            .filter(|(idx, _)| !accepted.contains(idx))
            .map(|(_, d)| d.clone())
            .collect();

        let matched = matches.iter().filter(|m| m.is_matched()).count();
        let status = if matched == 0 {
            MatchStatus::NoMatches
        } else if matched == profiles.len() {
            MatchStatus::FullMatches
        } else {
            MatchStatus::PartialMatches
        };

        Ok(MatchingResult {
            status,
            matches,
            unmatched_performance,
            unmatched_discovered,
        })
    }

    /// Combined confidence for one profile name against one discovered
    /// endpoint, in [0.0, 1.0].
    pub fn confidence(&self, profile_endpoint: &str, discovered: &DiscoveredEndpoint) -> f64 {
        let profile = self.normalizer.profile(profile_endpoint);
        let candidate = self.normalizer.discovered(discovered);
        self.combine(&profile, &candidate)
    }

    pub fn component_scores(
        &self,
        profile: &NormalizedEndpoint,
        discovered: &NormalizedEndpoint,
    ) -> ComponentScores {
        ComponentScores {
            exact: self.exact.score(profile, discovered),
            fuzzy: self.fuzzy.score(profile, discovered),
            phrase: self.phrase.score(profile, discovered),
            semantic: self.semantic.score(profile, discovered),
            framework: self.framework.score(profile, discovered),
        }
    }

    /// Blends the component scores.
    ///
    /// Two special cases bind before the weighted blend: a generic
    /// discovered endpoint is capped so it cannot absorb a meaningful
    /// profile, and a decisive exact score settles the match by itself.
    fn combine(&self, profile: &NormalizedEndpoint, discovered: &NormalizedEndpoint) -> f64 {
        let scores = self.component_scores(profile, discovered);

        if discovered.generic && !profile.generic {
            let cap = if profile.shares_token(discovered) {
                GENERIC_OVERLAP_CAP
            } else {
                GENERIC_NO_OVERLAP_CAP
            };
            return self.weighted(&scores).min(cap).clamp(0.0, 1.0);
        }

        if scores.exact >= EXACT_DECISIVE {
            return scores.exact.max(0.95 * scores.phrase).clamp(0.0, 1.0);
        }

        self.weighted(&scores).clamp(0.0, 1.0)
    }

    fn weighted(&self, scores: &ComponentScores) -> f64 {
        self.weights.exact * scores.exact
            + self.weights.fuzzy * scores.fuzzy
            + self.weights.phrase * scores.phrase
            + self.weights.semantic * scores.semantic
            + self.weights.framework * scores.framework
    }
}
