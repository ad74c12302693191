//! Code context around a route match: enclosing function, branching
//! complexity, and shallow quality heuristics.
//!
//! Everything here is lexical. The goal is a cheap, deterministic signal
//! for prioritisation, not a sound analysis.

use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use super::rules::Ecosystem;
use crate::model::IssueTag;

/// Lines scanned beyond the match line when looking for the enclosing
/// function signature.
const SIGNATURE_LOOKAHEAD: usize = 5;

/// Hard cap on how many lines a function body scan may cover.
const BODY_SCAN_LIMIT: usize = 80;

/// Fallback body window when no signature is found (fluent/anonymous
/// handlers).
const ANONYMOUS_BODY_LINES: usize = 12;

/// Keywords a signature capture can never be.
const NOT_FUNCTION_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "else",
];

/// Located enclosing function for one route match.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    /// Zero-based line of the signature.
    pub line: usize,
    pub is_async: bool,
}

pub struct ContextAnalyzer {
    signatures: HashMap<Ecosystem, Vec<Regex>>,
    branch_regex: Regex,
    boolean_regex: Regex,
    loop_regex: Regex,
    query_regex: Regex,
    handler_regex: Regex,
}

impl ContextAnalyzer {
    pub fn new() -> Result<Self, regex::Error> {
        let mut signatures = HashMap::new();
        signatures.insert(
            Ecosystem::Python,
            vec![Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)\s*\(")?],
        );
        signatures.insert(
            Ecosystem::JavaScript,
            vec![
                Regex::new(r"\bfunction\s+(\w+)\s*\(")?,
                Regex::new(r"\b(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:function\b|\()")?,
                Regex::new(r"^\s*(?:public\s+|private\s+)?(?:async\s+)?(\w+)\s*\([^)]*\)\s*\{")?,
            ],
        );
        signatures.insert(
            Ecosystem::Java,
            vec![
                Regex::new(r"(?:public|protected|private)\s+[^=(\r\n]*?(\w+)\s*\(")?,
                Regex::new(r"\bfun\s+(\w+)\s*\(")?,
            ],
        );
        signatures.insert(
            Ecosystem::CSharp,
            vec![Regex::new(r"(?:public|protected|private|internal)\s+[^=(\r\n]*?(\w+)\s*\(")?],
        );
        signatures.insert(Ecosystem::Ruby, vec![Regex::new(r"^\s*def\s+(\w+)")?]);
        signatures.insert(
            Ecosystem::Php,
            vec![Regex::new(r"\bfunction\s+(\w+)\s*\(")?],
        );
        signatures.insert(
            Ecosystem::Go,
            vec![Regex::new(r"\bfunc\s+(?:\([^)]*\)\s*)?(\w+)\s*\(")?],
        );
        signatures.insert(Ecosystem::Rust, vec![Regex::new(r"\bfn\s+(\w+)")?]);

        Ok(Self {
            signatures,
            branch_regex: Regex::new(
                r"\b(?:if|elif|for|while|case|when|except|catch|rescue)\b",
            )?,
            boolean_regex: Regex::new(r"&&|\|\||\band\b|\bor\b")?,
            loop_regex: Regex::new(r"\b(?:for|while)\b")?,
            query_regex: Regex::new(
                r"\b(?:query|execute|find_all|find|filter|fetch_all|fetch)\s*\(|\bdb\.",
            )?,
            handler_regex: Regex::new(r"\b(?:try|except|catch|rescue)\b")?,
        })
    }

    /// Nearest function signature at or below the match line, within the
    /// lookahead bound. Decorator- and attribute-style idioms put the
    /// handler underneath the route declaration, so the scan runs forward.
    pub fn locate_function(
        &self,
        lines: &[&str],
        match_line: usize,
        ecosystem: Option<Ecosystem>,
    ) -> Option<FunctionInfo> {
        let patterns = self.signatures.get(&ecosystem?)?;
        let end = (match_line + SIGNATURE_LOOKAHEAD + 1).min(lines.len());
        for (offset, line) in lines[match_line..end].iter().enumerate() {
            for pattern in patterns {
                if let Some(caps) = pattern.captures(line) {
                    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    if name.is_empty() || NOT_FUNCTION_NAMES.contains(&name) {
                        continue;
                    }
                    return Some(FunctionInfo {
                        name: name.to_string(),
                        line: match_line + offset,
                        is_async: line.contains("async "),
                    });
                }
            }
        }
        None
    }

    /// Synthetic handler name derived from the route path, used when no
    /// signature is in range.
    pub fn synthesize_name(path: &str) -> String {
        let mut name = String::new();
        for c in path.chars() {
            if c.is_ascii_alphanumeric() {
                name.push(c.to_ascii_lowercase());
            } else if c == '{' || c == '}' || c == '<' || c == '>' {
                continue;
            } else if !name.ends_with('_') {
                name.push('_');
            }
        }
        let name = name.trim_matches('_').to_string();
        if name.is_empty() {
            "handler".to_string()
        } else {
            name
        }
    }

    /// Text of the function starting at `sig_line`, bounded by indentation
    /// scope (Python/Ruby) or brace balance (everything else), and capped
    /// at `BODY_SCAN_LIMIT` lines.
    pub fn function_body(
        &self,
        lines: &[&str],
        sig_line: usize,
        ecosystem: Option<Ecosystem>,
    ) -> String {
        let end = match ecosystem {
            Some(Ecosystem::Python) | Some(Ecosystem::Ruby) => {
                Self::indentation_scope_end(lines, sig_line)
            }
            _ => Self::brace_scope_end(lines, sig_line),
        };
        lines[sig_line..end].join("\n")
    }

    /// Body window used for fluent/anonymous handlers with no signature.
    pub fn anonymous_body(lines: &[&str], match_line: usize) -> String {
        let end = (match_line + ANONYMOUS_BODY_LINES).min(lines.len());
        lines[match_line..end].join("\n")
    }

    fn indentation_scope_end(lines: &[&str], sig_line: usize) -> usize {
        let indent = leading_whitespace(lines[sig_line]);
        let limit = (sig_line + BODY_SCAN_LIMIT).min(lines.len());
        for (idx, line) in lines.iter().enumerate().take(limit).skip(sig_line + 1) {
            if line.trim().is_empty() {
                continue;
            }
            if leading_whitespace(line) <= indent {
                return idx;
            }
        }
        limit
    }

    fn brace_scope_end(lines: &[&str], sig_line: usize) -> usize {
        let limit = (sig_line + BODY_SCAN_LIMIT).min(lines.len());
        let mut depth: i32 = 0;
        let mut opened = false;
        for (idx, line) in lines.iter().enumerate().take(limit).skip(sig_line) {
            for c in line.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            if opened && depth <= 0 {
                return idx + 1;
            }
        }
        limit
    }

    /// Weighted branching density of a function body, normalized to [0, 10].
    /// Conditionals, loops, and exception handlers weigh 1.0; boolean
    /// operators weigh 0.5.
    pub fn complexity(&self, body: &str) -> f64 {
        let branches = self.branch_regex.find_iter(body).count() as f64;
        let booleans = self.boolean_regex.find_iter(body).count() as f64;
        let score = ((branches + 0.5 * booleans) / 2.5).min(10.0);
        (score * 10.0).round() / 10.0
    }

    /// Shallow textual quality checks over the function body.
    pub fn issues(&self, body: &str, is_async: bool) -> BTreeSet<IssueTag> {
        let lower = body.to_lowercase();
        let mut tags = BTreeSet::new();

        if !lower.contains("cache") {
            tags.insert(IssueTag::NoCaching);
        }
        if !self.handler_regex.is_match(&lower) {
            tags.insert(IssueTag::NoErrorHandling);
        }
        if !lower.contains("valid") {
            tags.insert(IssueTag::NoValidation);
        }
        if let Some(loop_pos) = self.loop_regex.find(&lower) {
            if self.query_regex.is_match(&lower[loop_pos.end()..]) {
                tags.insert(IssueTag::PotentialNPlusOneQuery);
            }
        }
        if is_async && !lower.contains("await") {
            tags.insert(IssueTag::AsyncWithoutAwait);
        }
        tags
    }

    /// Fixed excerpt window: two lines above the match through ten below.
    pub fn excerpt(lines: &[&str], match_line: usize) -> String {
        let start = match_line.saturating_sub(2);
        let end = (match_line + 11).min(lines.len());
        lines[start..end].join("\n")
    }
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ContextAnalyzer {
        ContextAnalyzer::new().unwrap()
    }

    #[test]
    fn test_locates_python_handler_below_decorator() {
        let lines: Vec<&str> = vec![
            "@app.get(\"/users/{id}\")",
            "async def get_user(user_id: int):",
            "    return db.find(user_id)",
        ];
        let info = analyzer()
            .locate_function(&lines, 0, Some(Ecosystem::Python))
            .unwrap();
        assert_eq!(info.name, "get_user");
        assert_eq!(info.line, 1);
        assert!(info.is_async);
    }

    #[test]
    fn test_lookahead_is_bounded() {
        let mut lines = vec!["app.get('/users', (req, res) => {"];
        for _ in 0..8 {
            lines.push("  // filler");
        }
        lines.push("function realHandler(req, res) {");
        assert!(analyzer()
            .locate_function(&lines, 0, Some(Ecosystem::JavaScript))
            .is_none());
    }

    #[test]
    fn test_keyword_is_never_a_function_name() {
        let lines = vec!["router.get('/x', h)", "  if (cached) {"];
        assert!(analyzer()
            .locate_function(&lines, 0, Some(Ecosystem::JavaScript))
            .is_none());
    }

    #[test]
    fn test_synthesized_names() {
        assert_eq!(
            ContextAnalyzer::synthesize_name("/api/users/{id}"),
            "api_users_id"
        );
        assert_eq!(ContextAnalyzer::synthesize_name("/"), "handler");
        assert_eq!(
            ContextAnalyzer::synthesize_name("orders/:id/items"),
            "orders_id_items"
        );
    }

    #[test]
    fn test_indentation_scope_bounds_python_body() {
        let lines: Vec<&str> = vec![
            "def handler():",
            "    if a:",
            "        x()",
            "",
            "    return y",
            "def next_fn():",
            "    pass",
        ];
        let body = analyzer().function_body(&lines, 0, Some(Ecosystem::Python));
        assert!(body.contains("return y"));
        assert!(!body.contains("next_fn"));
    }

    #[test]
    fn test_brace_scope_bounds_js_body() {
        let lines: Vec<&str> = vec![
            "function handler(req, res) {",
            "  if (req.id) {",
            "    res.send(db.find(req.id));",
            "  }",
            "}",
            "function other() {}",
        ];
        let body = analyzer().function_body(&lines, 0, Some(Ecosystem::JavaScript));
        assert!(body.contains("res.send"));
        assert!(!body.contains("other"));
    }

    #[test]
    fn test_complexity_weights_and_cap() {
        let analyzer = analyzer();
        assert_eq!(analyzer.complexity("return 1"), 0.0);

        // Two branch keywords and one boolean operator: (2 + 0.5) / 2.5.
        let body = "if a and b:\n    for x in xs:\n        pass";
        assert_eq!(analyzer.complexity(body), 1.0);

        let dense = "if x {\n}\n".repeat(40);
        assert_eq!(analyzer.complexity(&dense), 10.0);
    }

    #[test]
    fn test_issue_detection() {
        let analyzer = analyzer();

        let body = "for user in users:\n    orders = db.query(user.id)\n    total += orders";
        let tags = analyzer.issues(body, false);
        assert!(tags.contains(&IssueTag::PotentialNPlusOneQuery));
        assert!(tags.contains(&IssueTag::NoCaching));
        assert!(tags.contains(&IssueTag::NoErrorHandling));
        assert!(tags.contains(&IssueTag::NoValidation));

        let careful = "try:\n    validate(input)\n    return cache.get(key)\nexcept KeyError:\n    pass";
        assert!(analyzer.issues(careful, false).is_empty());
    }

    #[test]
    fn test_async_without_await() {
        let analyzer = analyzer();
        let tags = analyzer.issues("async def f():\n    return compute()", true);
        assert!(tags.contains(&IssueTag::AsyncWithoutAwait));

        let awaited = "async def f():\n    return await compute()";
        assert!(!analyzer
            .issues(awaited, true)
            .contains(&IssueTag::AsyncWithoutAwait));
    }

    #[test]
    fn test_excerpt_window() {
        let lines: Vec<&str> = (0..30).map(|_| "line").collect();
        let excerpt = ContextAnalyzer::excerpt(&lines, 5);
        assert_eq!(excerpt.lines().count(), 13);

        let top = ContextAnalyzer::excerpt(&lines, 0);
        assert_eq!(top.lines().count(), 11);
    }
}
