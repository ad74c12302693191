//! Endpoint-name normalization.
//!
//! Performance profiles name endpoints loosely ("Get Issues List") while
//! discovery produces canonical routes ("GET /issues"). Both sides are
//! reduced to the same canonical form before any strategy scores them, so
//! comparisons measure meaning rather than formatting.

use regex::Regex;
use serde::Serialize;

use crate::model::DiscoveredEndpoint;

/// HTTP verbs stripped from the front of an endpoint name and excluded
/// from meaningful tokens.
const HTTP_VERBS: &[&str] = &["get", "post", "put", "delete", "patch", "head", "options"];

/// Single tokens that identify an endpoint too weakly to match against.
const GENERIC_NAMES: &[&str] = &[
    "index", "home", "main", "app", "root", "default", "base", "common", "misc", "util",
    "helper", "handler", "route", "endpoint",
];

/// An endpoint name reduced to canonical form, with its token views
/// precomputed. Discovered endpoints also carry their framework so the
/// framework strategy can score without reaching back into the model.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedEndpoint {
    pub raw: String,
    pub normalized: String,
    pub tokens: Vec<String>,
    /// Tokens that carry identity: longer than two characters and neither
    /// an HTTP verb nor an API scaffolding word.
    pub meaningful: Vec<String>,
    pub generic: bool,
    pub framework: Option<String>,
}

impl NormalizedEndpoint {
    /// True when the two endpoints share at least one meaningful token.
    pub fn shares_token(&self, other: &NormalizedEndpoint) -> bool {
        self.meaningful
            .iter()
            .any(|t| other.meaningful.contains(t))
    }
}

pub struct Normalizer {
    verb_prefix: Regex,
    scope_prefix: Regex,
    separators: Regex,
    noise_suffix: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            verb_prefix: Regex::new(r"^(?:get|post|put|delete|patch|head|options)\s+")?,
            scope_prefix: Regex::new(r"^(?:api/|v\d+/)+")?,
            separators: Regex::new(r"[^a-z0-9]+")?,
            noise_suffix: Regex::new(r"(?:_list|_items|_data|_info|_details|_get|_fetch)$")?,
        })
    }

    /// Canonical form of an endpoint name. Lowercases, drops a leading
    /// HTTP verb, strips API and version scaffolding, collapses every
    /// separator run to `_`, and removes noise suffixes.
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        let without_verb = self.verb_prefix.replace(&lowered, "");
        let trimmed = without_verb.trim_matches('/');
        let without_scope = self.scope_prefix.replace(trimmed, "");
        let collapsed = self.separators.replace_all(&without_scope, "_");
        let stripped = self.noise_suffix.replace(collapsed.trim_matches('_'), "");
        stripped.trim_matches('_').to_string()
    }

    pub fn profile(&self, raw: &str) -> NormalizedEndpoint {
        self.build(raw, None)
    }

    pub fn discovered(&self, endpoint: &DiscoveredEndpoint) -> NormalizedEndpoint {
        self.build(&endpoint.endpoint, Some(endpoint.framework.clone()))
    }

    fn build(&self, raw: &str, framework: Option<String>) -> NormalizedEndpoint {
        let normalized = self.normalize(raw);
        let tokens: Vec<String> = normalized
            .split('_')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let meaningful: Vec<String> = tokens
            .iter()
            .filter(|t| t.len() > 2 && !HTTP_VERBS.contains(&t.as_str()) && t.as_str() != "api")
            .cloned()
            .collect();
        let generic = normalized.is_empty()
            || meaningful.is_empty()
            || (meaningful.len() == 1 && GENERIC_NAMES.contains(&meaningful[0].as_str()));
        NormalizedEndpoint {
            raw: raw.to_string(),
            normalized,
            tokens,
            meaningful,
            generic,
            framework,
        }
    }
}
