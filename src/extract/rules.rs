//! Route-declaration rules as data.
//!
//! Every supported routing idiom is one `RouteRule` entry: a regex plus
//! declarative instructions for deriving the HTTP method and path from its
//! captures. A single generic loop in the extractor consumes the whole
//! table, so adding a framework means adding entries, not branches.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ecosystems;

/// Language family a rule applies to, keyed off the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Python,
    JavaScript,
    Java,
    CSharp,
    Ruby,
    Php,
    Go,
    Rust,
}

impl Ecosystem {
    pub fn for_extension(ext: &str) -> Option<Ecosystem> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Ecosystem::Python),
            "js" | "ts" | "jsx" | "tsx" | "mjs" => Some(Ecosystem::JavaScript),
            "java" | "kt" | "kts" | "scala" => Some(Ecosystem::Java),
            "cs" => Some(Ecosystem::CSharp),
            "rb" => Some(Ecosystem::Ruby),
            "php" => Some(Ecosystem::Php),
            "go" => Some(Ecosystem::Go),
            "rs" => Some(Ecosystem::Rust),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Python => "python",
            Ecosystem::JavaScript => "javascript",
            Ecosystem::Java => "java",
            Ecosystem::CSharp => "csharp",
            Ecosystem::Ruby => "ruby",
            Ecosystem::Php => "php",
            Ecosystem::Go => "go",
            Ecosystem::Rust => "rust",
        }
    }

    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::Python,
            Ecosystem::JavaScript,
            Ecosystem::Java,
            Ecosystem::CSharp,
            Ecosystem::Ruby,
            Ecosystem::Php,
            Ecosystem::Go,
            Ecosystem::Rust,
        ]
    }
}

/// How a rule derives the HTTP method from one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSpec {
    /// The idiom implies one verb (e.g. bare Django `path(...)`).
    Fixed(&'static str),
    /// Uppercase a captured verb (`get` → `GET`).
    Capture(usize),
    /// Map a captured annotation name to its verb
    /// (`GetMapping` → `GET`, `HttpPost` → `POST`, `Delete` → `DELETE`).
    Annotation(usize),
}

/// How a rule derives the route path from one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSpec {
    /// The captured route template, verbatim.
    Capture(usize),
    /// Synthesise a path from a captured handler name (convention routing).
    HandlerName(usize),
    /// Method-level suffix composed onto the controller's base route.
    ControllerRelative(usize),
    /// The controller's base route alone (bare method attribute).
    ControllerRoot,
}

/// One routing idiom, declared as data.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub framework: &'static str,
    pub ecosystem: Ecosystem,
    pub pattern: &'static str,
    pub method: MethodSpec,
    pub path: PathSpec,
}

/// Locates the controller-level base route for attribute-routed classes,
/// so `ControllerRelative`/`ControllerRoot` rules can compose full paths.
#[derive(Debug, Clone)]
pub struct ControllerBinding {
    pub ecosystem: Ecosystem,
    /// Captures the controller name (without its suffix).
    pub class_pattern: &'static str,
    /// Captures the class-level route template; searched in the window
    /// immediately above the class declaration.
    pub route_pattern: &'static str,
    /// Template token replaced by the lowercased controller name.
    pub token: &'static str,
    /// Base used when the class declares no route attribute; `{name}` is
    /// replaced by the lowercased controller name.
    pub default_template: &'static str,
}

#[derive(Debug, Error)]
#[error("invalid pattern for {framework}: {source}")]
pub struct RuleCompileError {
    pub framework: &'static str,
    #[source]
    pub source: regex::Error,
}

const HTTP_VERBS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

fn normalize_verb(raw: &str) -> Option<String> {
    let stripped = raw
        .trim()
        .trim_start_matches("Http")
        .trim_end_matches("Mapping");
    let verb = stripped.to_ascii_uppercase();
    if HTTP_VERBS.contains(&verb.as_str()) {
        Some(verb)
    } else {
        None
    }
}

/// A rule with its regex compiled, ready for matching.
pub struct CompiledRule {
    pub framework: &'static str,
    pub ecosystem: Ecosystem,
    pub regex: Regex,
    method: MethodSpec,
    path: PathSpec,
}

impl CompiledRule {
    fn compile(rule: &RouteRule) -> Result<Self, RuleCompileError> {
        let regex = Regex::new(rule.pattern).map_err(|source| RuleCompileError {
            framework: rule.framework,
            source,
        })?;
        Ok(Self {
            framework: rule.framework,
            ecosystem: rule.ecosystem,
            regex,
            method: rule.method,
            path: rule.path,
        })
    }

    pub fn derive_method(&self, caps: &Captures<'_>) -> Option<String> {
        match self.method {
            MethodSpec::Fixed(verb) => Some(verb.to_string()),
            MethodSpec::Capture(group) => {
                let raw = caps.get(group)?.as_str();
                Some(raw.trim().to_ascii_uppercase())
            }
            MethodSpec::Annotation(group) => normalize_verb(caps.get(group)?.as_str()),
        }
    }

    /// Raw path before cleanup; `base` is the controller base route when the
    /// file declares one.
    pub fn derive_path(&self, caps: &Captures<'_>, base: Option<&str>) -> Option<String> {
        match self.path {
            PathSpec::Capture(group) => Some(caps.get(group)?.as_str().trim().to_string()),
            PathSpec::HandlerName(group) => {
                let name = caps.get(group)?.as_str().trim();
                if name.is_empty() {
                    None
                } else {
                    Some(format!("/{}", name))
                }
            }
            PathSpec::ControllerRelative(group) => {
                let suffix = caps.get(group)?.as_str().trim();
                Some(join_route(base?, suffix))
            }
            PathSpec::ControllerRoot => Some(base?.to_string()),
        }
    }

    pub fn needs_controller_base(&self) -> bool {
        matches!(
            self.path,
            PathSpec::ControllerRelative(_) | PathSpec::ControllerRoot
        )
    }
}

/// Joins a controller base route and a method-level suffix with exactly one
/// separator.
pub fn join_route(base: &str, suffix: &str) -> String {
    let base = base.trim_end_matches('/');
    let suffix = suffix.trim_start_matches('/');
    if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, suffix)
    }
}

struct CompiledBinding {
    ecosystem: Ecosystem,
    class_regex: Regex,
    route_regex: Regex,
    token: &'static str,
    default_template: &'static str,
}

/// How far above a class declaration its route attribute may sit.
const BINDING_WINDOW: usize = 200;

impl CompiledBinding {
    fn compile(binding: &ControllerBinding) -> Result<Self, RuleCompileError> {
        let class_regex = Regex::new(binding.class_pattern).map_err(|source| RuleCompileError {
            framework: "controller binding",
            source,
        })?;
        let route_regex = Regex::new(binding.route_pattern).map_err(|source| RuleCompileError {
            framework: "controller binding",
            source,
        })?;
        Ok(Self {
            ecosystem: binding.ecosystem,
            class_regex,
            route_regex,
            token: binding.token,
            default_template: binding.default_template,
        })
    }

    fn resolve_base(&self, content: &str) -> Option<String> {
        let class_match = self.class_regex.captures(content)?;
        let name = class_match.get(1)?.as_str().to_ascii_lowercase();

        let class_start = class_match.get(0)?.start();
        let window_start = floor_char_boundary(content, class_start.saturating_sub(BINDING_WINDOW));
        let window = &content[window_start..class_start];

        let base = match self.route_regex.captures(window) {
            Some(route) => route.get(1)?.as_str().replace(self.token, &name),
            None => self.default_template.replace("{name}", &name),
        };
        let base = base.trim().trim_end_matches('/');
        if base.is_empty() {
            None
        } else if base.starts_with('/') {
            Some(base.to_string())
        } else {
            Some(format!("/{}", base))
        }
    }
}

pub(crate) fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

pub(crate) fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    index = index.min(s.len());
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// The full compiled rule table, shared by every extraction pass.
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    bindings: Vec<CompiledBinding>,
}

impl RuleSet {
    /// Compiles the built-in tables from every ecosystem module.
    pub fn build() -> Result<Self, RuleCompileError> {
        Self::from_rules(&ecosystems::all_rules(), &ecosystems::controller_bindings())
    }

    pub fn from_rules(
        rules: &[RouteRule],
        bindings: &[ControllerBinding],
    ) -> Result<Self, RuleCompileError> {
        let rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let bindings = bindings
            .iter()
            .map(CompiledBinding::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules, bindings })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules scoped to one ecosystem, in table order.
    pub fn rules_for(&self, ecosystem: Ecosystem) -> impl Iterator<Item = &CompiledRule> {
        self.rules
            .iter()
            .filter(move |r| r.ecosystem == ecosystem)
    }

    /// Every rule, used by the fallback pass on files with no ecosystem.
    pub fn all(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    /// Base route for attribute-routed controllers in this file, if the
    /// ecosystem defines a binding and the file declares a controller.
    pub fn controller_base(&self, ecosystem: Ecosystem, content: &str) -> Option<String> {
        self.bindings
            .iter()
            .find(|b| b.ecosystem == ecosystem)
            .and_then(|b| b.resolve_base(content))
    }
}
