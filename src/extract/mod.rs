//! Endpoint extraction.
//!
//! Runs the compiled rule table over file contents and enriches every
//! surviving match with its code context: enclosing function, complexity,
//! issue tags, risk, and an excerpt. The extractor is pure with respect to
//! its inputs; all I/O lives in the discovery layer.

pub mod context;
pub mod ecosystems;
pub mod rules;
pub mod validity;

pub use context::ContextAnalyzer;
pub use rules::{Ecosystem, RuleCompileError, RuleSet};

use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::DiscoveredEndpoint;
use crate::risk;
use rules::CompiledRule;

/// Files longer than this are extracted in overlapping chunks.
pub const DEFAULT_CHUNK_LINES: usize = 512;

/// Lines shared between consecutive chunks. Must exceed the line span of
/// any rule pattern so a match truncated at a boundary reappears whole in
/// the next chunk.
pub const DEFAULT_CHUNK_OVERLAP: usize = 64;

/// Which validity tier a pass applies.
///
/// The primary pass runs over recognised source files with the standard
/// plausibility filter. The fallback pass runs over a widened file set and
/// compensates with a stricter filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Primary,
    Fallback,
}

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error(transparent)]
    Rule(#[from] RuleCompileError),
    #[error("extractor pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

pub struct EndpointExtractor {
    rules: RuleSet,
    context: ContextAnalyzer,
    /// Django-style `<int:pk>` parameters.
    angle_param: Regex,
    /// Route constraints like `{id:guid}`.
    constraint: Regex,
}

impl EndpointExtractor {
    pub fn new() -> Result<Self, ExtractorError> {
        Ok(Self {
            rules: RuleSet::build()?,
            context: ContextAnalyzer::new()?,
            angle_param: Regex::new(r"<(?:\w+:)?(\w+)>")?,
            constraint: Regex::new(r"\{(\w+)\s*:[^}]*\}")?,
        })
    }

    /// Primary-pass extraction for one file.
    pub fn extract(&self, file_path: &str, content: &str) -> Vec<DiscoveredEndpoint> {
        self.extract_with_mode(file_path, content, ExtractionMode::Primary)
    }

    /// Runs every applicable rule over `content` and returns unique
    /// endpoints sorted by line number.
    pub fn extract_with_mode(
        &self,
        file_path: &str,
        content: &str,
        mode: ExtractionMode,
    ) -> Vec<DiscoveredEndpoint> {
        let ecosystem = file_extension(file_path).and_then(Ecosystem::for_extension);
        let rule_list: Vec<&CompiledRule> = match (ecosystem, mode) {
            (Some(eco), _) => self.rules.rules_for(eco).collect(),
            (None, ExtractionMode::Fallback) => self.rules.all().collect(),
            (None, ExtractionMode::Primary) => return Vec::new(),
        };

        let base = ecosystem
            .filter(|_| rule_list.iter().any(|r| r.needs_controller_base()))
            .and_then(|eco| self.rules.controller_base(eco, content));
        let lines: Vec<&str> = content.lines().collect();

        let mut seen: HashSet<(String, usize)> = HashSet::new();
        let mut found = Vec::new();
        for rule in rule_list {
            for caps in rule.regex.captures_iter(content) {
                let full = match caps.get(0) {
                    Some(m) => m,
                    None => continue,
                };
                let method = match rule.derive_method(&caps) {
                    Some(m) => m,
                    None => continue,
                };
                let raw_path = match rule.derive_path(&caps, base.as_deref()) {
                    Some(p) => p,
                    None => continue,
                };
                if !self.passes_filter(&raw_path, mode, content, full.start(), full.end()) {
                    continue;
                }

                let match_line = line_index(content, full.start());
                let line_number = match_line + 1;
                let path = self.clean_path(&raw_path);
                let endpoint = format!("{} {}", method, path);
                if !seen.insert((endpoint.clone(), line_number)) {
                    continue;
                }

                let located = self.context.locate_function(&lines, match_line, ecosystem);
                let (function_name, body, is_async) = match &located {
                    Some(info) => (
                        info.name.clone(),
                        self.context.function_body(&lines, info.line, ecosystem),
                        info.is_async,
                    ),
                    None => (
                        ContextAnalyzer::synthesize_name(&path),
                        ContextAnalyzer::anonymous_body(&lines, match_line),
                        false,
                    ),
                };

                let complexity = self.context.complexity(&body);
                let issue_tags = self.context.issues(&body, is_async);
                let mut ep = DiscoveredEndpoint::new(endpoint, file_path, line_number)
                    .with_function(function_name)
                    .with_framework(rule.framework);
                ep.complexity_score = complexity;
                ep.risk_level = risk::classify(complexity, &issue_tags);
                ep.issue_tags = issue_tags;
                ep.code_excerpt = ContextAnalyzer::excerpt(&lines, match_line);
                found.push(ep);
            }
        }

        found.sort_by(|a, b| {
            a.line_number
                .cmp(&b.line_number)
                .then_with(|| a.endpoint.cmp(&b.endpoint))
        });
        found
    }

    /// Chunked extraction for oversized files. Line numbers are corrected
    /// to the whole file and duplicates from overlap regions collapse to
    /// their first occurrence, so the result matches a whole-file pass.
    pub fn extract_chunked(
        &self,
        file_path: &str,
        content: &str,
        chunk_lines: usize,
        overlap: usize,
        mode: ExtractionMode,
    ) -> Vec<DiscoveredEndpoint> {
        let lines: Vec<&str> = content.lines().collect();
        if chunk_lines == 0 || lines.len() <= chunk_lines {
            return self.extract_with_mode(file_path, content, mode);
        }

        let step = chunk_lines.saturating_sub(overlap).max(1);
        let mut seen: HashSet<(String, usize)> = HashSet::new();
        let mut found = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + chunk_lines).min(lines.len());
            let chunk = lines[start..end].join("\n");
            for mut ep in self.extract_with_mode(file_path, &chunk, mode) {
                ep.line_number += start;
                if seen.insert((ep.endpoint.clone(), ep.line_number)) {
                    found.push(ep);
                }
            }
            if end == lines.len() {
                break;
            }
            start += step;
        }

        found.sort_by(|a, b| {
            a.line_number
                .cmp(&b.line_number)
                .then_with(|| a.endpoint.cmp(&b.endpoint))
        });
        found
    }

    fn passes_filter(
        &self,
        raw_path: &str,
        mode: ExtractionMode,
        content: &str,
        start: usize,
        end: usize,
    ) -> bool {
        let plausible = match mode {
            ExtractionMode::Primary => validity::plausible_path(raw_path),
            ExtractionMode::Fallback => validity::strictly_plausible(raw_path),
        };
        plausible && !validity::in_config_context(content, start, end)
    }

    /// Normalises a raw route template: Django angle parameters become
    /// brace parameters, route constraints are stripped, and the path is
    /// anchored at `/`.
    fn clean_path(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let converted = self.angle_param.replace_all(trimmed, "{$1}");
        let cleaned = self.constraint.replace_all(&converted, "{$1}");
        if cleaned.starts_with('/') {
            cleaned.into_owned()
        } else {
            format!("/{}", cleaned)
        }
    }
}

fn file_extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => Some(ext),
        _ => None,
    }
}

/// Zero-based line of a byte offset.
fn line_index(content: &str, byte_offset: usize) -> usize {
    content.as_bytes()[..byte_offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
}
