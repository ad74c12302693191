//! Scoring strategies for endpoint matching.
//!
//! Each strategy judges one notion of similarity between a performance
//! profile endpoint and a discovered endpoint, and returns a score in
//! [0.0, 1.0]. The matcher blends them with configured weights; nothing
//! here reads configuration or carries state between calls.

use strsim::normalized_levenshtein;

use super::normalize::NormalizedEndpoint;

/// One similarity judgment. Implementations must be pure and bounded to
/// [0.0, 1.0].
pub trait MatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn score(&self, profile: &NormalizedEndpoint, discovered: &NormalizedEndpoint) -> f64;
}

/// Token groups that count as near-equivalent when comparing endpoint
/// names semantically.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["get", "fetch", "retrieve", "read", "list", "show"],
    &["post", "create", "add", "new", "insert"],
    &["put", "update", "edit", "modify", "patch"],
    &["delete", "remove", "destroy", "del"],
    &["users", "user", "accounts", "account", "members", "member"],
    &["issues", "issue", "tickets", "ticket", "bugs", "bug"],
    &["order", "orders", "checkout", "cart", "purchase", "purchases"],
    &["payment", "payments", "billing", "invoice", "invoices", "charge", "charges"],
    &["data", "info", "details", "metadata"],
    &["auth", "login", "authentication", "signin", "token"],
    &["config", "configuration", "settings", "preferences", "options"],
    &["status", "health", "ping", "heartbeat"],
    &["report", "reports", "analytics", "stats", "statistics", "metrics"],
    &["file", "files", "upload", "uploads", "document", "documents", "attachment"],
    &["search", "query", "find", "lookup", "filter"],
    &["dashboard", "overview", "summary", "home"],
    &["profile", "profiles", "account", "self"],
    &["notification", "notifications", "alert", "alerts", "message", "messages"],
    &["session", "sessions", "logout", "signout"],
    &["permission", "permissions", "role", "roles", "access"],
    &["category", "categories", "tag", "tags", "label", "labels"],
    &["template", "templates", "layout", "layouts", "theme", "themes"],
];

fn are_synonyms(a: &str, b: &str) -> bool {
    SYNONYM_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}

/// Equality on canonical forms: 1.0 for identity, 0.95 when one form
/// contains the other, otherwise 0.0. A generic side never matches a
/// meaningful one exactly.
pub struct ExactStrategy;

impl MatchStrategy for ExactStrategy {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn score(&self, profile: &NormalizedEndpoint, discovered: &NormalizedEndpoint) -> f64 {
        if profile.generic != discovered.generic {
            return 0.0;
        }
        if profile.normalized == discovered.normalized {
            return 1.0;
        }
        if !profile.normalized.is_empty()
            && !discovered.normalized.is_empty()
            && (profile.normalized.contains(&discovered.normalized)
                || discovered.normalized.contains(&profile.normalized))
        {
            return 0.95;
        }
        0.0
    }
}

/// Character-level similarity with a word-overlap floor. Scores without
/// shared words are damped hard so incidental letter overlap cannot pass
/// a sensible threshold on its own.
pub struct FuzzyStrategy;

impl MatchStrategy for FuzzyStrategy {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn score(&self, profile: &NormalizedEndpoint, discovered: &NormalizedEndpoint) -> f64 {
        if profile.generic != discovered.generic {
            return 0.0;
        }
        let mut sim = normalized_levenshtein(&profile.normalized, &discovered.normalized);
        if profile.shares_token(discovered) {
            let shared = profile
                .meaningful
                .iter()
                .filter(|t| discovered.meaningful.contains(t))
                .count();
            let union = profile.meaningful.len() + discovered.meaningful.len() - shared;
            if union > 0 {
                sim = sim.max(shared as f64 / union as f64);
            }
        } else {
            sim *= 0.3;
        }
        if sim > 0.8 {
            sim
        } else if sim > 0.6 {
            sim * 0.9
        } else if sim > 0.4 {
            sim * 0.7
        } else {
            sim * 0.5
        }
    }
}

/// Whole-phrase comparison over meaningful tokens.
pub struct PhraseStrategy;

impl MatchStrategy for PhraseStrategy {
    fn name(&self) -> &'static str {
        "phrase"
    }

    fn score(&self, profile: &NormalizedEndpoint, discovered: &NormalizedEndpoint) -> f64 {
        if profile.meaningful.is_empty() || discovered.meaningful.is_empty() {
            return 0.1;
        }
        let p_phrase = profile.meaningful.join(" ");
        let d_phrase = discovered.meaningful.join(" ");
        if p_phrase == d_phrase {
            return 1.0;
        }
        if p_phrase.contains(&d_phrase) || d_phrase.contains(&p_phrase) {
            return 0.95;
        }

        let shared = profile
            .meaningful
            .iter()
            .filter(|t| discovered.meaningful.contains(t))
            .count();
        if shared == profile.meaningful.len() {
            return 0.9;
        }
        if shared > 0 {
            let ratio = shared as f64 / profile.meaningful.len() as f64;
            let char_sim = normalized_levenshtein(&p_phrase, &d_phrase);
            return (0.9 * ratio).max(char_sim).min(0.9);
        }
        (normalized_levenshtein(&p_phrase, &d_phrase) * 0.3).min(0.2)
    }
}

/// Token-by-token comparison with synonym credit: every profile token
/// earns its best score against the discovered tokens (identity 1.0,
/// synonym 0.8), averaged over the profile's token count.
pub struct SemanticStrategy;

impl MatchStrategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn score(&self, profile: &NormalizedEndpoint, discovered: &NormalizedEndpoint) -> f64 {
        if profile.meaningful.is_empty() || discovered.meaningful.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        for p_token in &profile.meaningful {
            let mut best = 0.0f64;
            for d_token in &discovered.meaningful {
                let s = if p_token == d_token {
                    1.0
                } else if are_synonyms(p_token, d_token) {
                    0.8
                } else {
                    0.0
                };
                best = best.max(s);
            }
            total += best;
        }
        total / profile.meaningful.len() as f64
    }
}

/// Prior on how API-shaped the discovered endpoint is: a recognised
/// framework scores 0.8, an API-scoped path 0.6, anything else 0.3.
pub struct FrameworkStrategy {
    version_segment: regex::Regex,
}

impl FrameworkStrategy {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            version_segment: regex::Regex::new(r"/v\d+/")?,
        })
    }
}

impl MatchStrategy for FrameworkStrategy {
    fn name(&self) -> &'static str {
        "framework"
    }

    fn score(&self, _profile: &NormalizedEndpoint, discovered: &NormalizedEndpoint) -> f64 {
        if let Some(framework) = &discovered.framework {
            if framework != "Unknown" {
                return 0.8;
            }
        }
        let raw = discovered.raw.to_lowercase();
        if raw.contains("/api/") || self.version_segment.is_match(&raw) {
            0.6
        } else {
            0.3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::normalize::Normalizer;

    fn pair(profile: &str, discovered: &str) -> (NormalizedEndpoint, NormalizedEndpoint) {
        let n = Normalizer::new().unwrap();
        let mut d = n.profile(discovered);
        d.framework = Some("FastAPI".to_string());
        (n.profile(profile), d)
    }

    fn strategies() -> Vec<Box<dyn MatchStrategy>> {
        vec![
            Box::new(ExactStrategy),
            Box::new(FuzzyStrategy),
            Box::new(PhraseStrategy),
            Box::new(SemanticStrategy),
            Box::new(FrameworkStrategy::new().unwrap()),
        ]
    }

    #[test]
    fn test_all_scores_are_bounded() {
        let cases = [
            ("GET /api/users/{id}", "GET /api/users/{id}"),
            ("Get Issues List", "GET /issues"),
            ("User Profile Settings", "GET /"),
            ("Checkout", "POST /api/v2/payments/checkout"),
            ("", ""),
        ];
        for strategy in strategies() {
            for (p, d) in &cases {
                let (p, d) = pair(p, d);
                let score = strategy.score(&p, &d);
                assert!(
                    (0.0..=1.0).contains(&score),
                    "{} out of bounds for {:?}: {}",
                    strategy.name(),
                    (&p.raw, &d.raw),
                    score
                );
            }
        }
    }

    #[test]
    fn test_exact_identity_and_containment() {
        let (p, d) = pair("GET /api/users/{id}", "GET /users/{id}");
        assert_eq!(ExactStrategy.score(&p, &d), 1.0);

        let (p, d) = pair("GET /users", "GET /api/users/{id}");
        assert_eq!(ExactStrategy.score(&p, &d), 0.95);

        let (p, d) = pair("GET /users", "GET /payments");
        assert_eq!(ExactStrategy.score(&p, &d), 0.0);
    }

    #[test]
    fn test_exact_refuses_generic_against_meaningful() {
        let (p, d) = pair("User Profile Settings", "GET /");
        assert_eq!(ExactStrategy.score(&p, &d), 0.0);
    }

    #[test]
    fn test_fuzzy_rewards_shared_words() {
        let (p, d) = pair("Orders Report", "GET /orders/report/daily");
        let with_overlap = FuzzyStrategy.score(&p, &d);

        let (p, d) = pair("Orders Report", "GET /payments");
        let without_overlap = FuzzyStrategy.score(&p, &d);

        assert!(with_overlap > without_overlap);
        assert!(without_overlap < 0.3);
    }

    #[test]
    fn test_phrase_full_containment() {
        let (p, d) = pair("Issues", "Get Issues List");
        assert!(PhraseStrategy.score(&p, &d) >= 0.9);
    }

    #[test]
    fn test_semantic_synonym_credit() {
        // "tickets" and "issues" share a synonym group.
        let (p, d) = pair("Tickets", "GET /issues");
        let score = SemanticStrategy.score(&p, &d);
        assert!((score - 0.8).abs() < 1e-9);

        // Credit is averaged over the profile's tokens.
        let (p, d) = pair("Fetch Tickets", "GET /issues");
        let averaged = SemanticStrategy.score(&p, &d);
        assert!((averaged - 0.4).abs() < 1e-9);

        let (p, d) = pair("GET /issues", "GET /issues");
        assert_eq!(SemanticStrategy.score(&p, &d), 1.0);
    }

    #[test]
    fn test_framework_prior_tiers() {
        let n = Normalizer::new().unwrap();
        let p = n.profile("Checkout");

        let mut known = n.profile("POST /checkout");
        known.framework = Some("Express".to_string());
        let strategy = FrameworkStrategy::new().unwrap();
        assert_eq!(strategy.score(&p, &known), 0.8);

        let mut scoped = n.profile("POST /api/checkout");
        scoped.framework = Some("Unknown".to_string());
        assert_eq!(strategy.score(&p, &scoped), 0.6);

        let mut bare = n.profile("POST /checkout");
        bare.framework = None;
        assert_eq!(strategy.score(&p, &bare), 0.3);
    }
}
