//! Plausibility filtering for derived route paths.
//!
//! Routing syntax is easy to confuse with bootstrap code: `app.use(...)`,
//! CORS setup, and server startup calls all superficially resemble route
//! registration. The primary filter rejects matches whose surrounding text
//! speaks that vocabulary. The strict tier replaces it during the widened
//! fallback pass, where config/markup files bring IDE keys and bare values
//! into scope.

use super::rules::{ceil_char_boundary, floor_char_boundary};

/// Vocabulary that marks application bootstrap rather than route handling.
const CONFIG_CONTEXT_MARKERS: &[&str] = &[
    "app.run(",
    "app.listen(",
    "app.use(",
    "middleware",
    "cors",
    "authentication",
    "configuration",
    "setup",
    "startup",
    "main(",
    "if __name__",
];

/// How far around a match the context check looks, in bytes per side.
const CONTEXT_WINDOW: usize = 100;

/// Accepts paths that plausibly denote a URL: a separator, a parameter
/// placeholder, or a short bare identifier.
pub fn plausible_path(path: &str) -> bool {
    let path = path.trim();
    if path.is_empty() || path.len() > 200 {
        return false;
    }
    if path.starts_with('/') || path.starts_with("api/") {
        return true;
    }
    if path.contains('/') || path.contains('{') || path.contains('<') || path.contains(':') {
        return true;
    }
    path.len() <= 40
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// True when the text around the match reads like bootstrap/configuration
/// code. The window covers `CONTEXT_WINDOW` bytes on each side.
pub fn in_config_context(content: &str, match_start: usize, match_end: usize) -> bool {
    let start = floor_char_boundary(content, match_start.saturating_sub(CONTEXT_WINDOW));
    let end = ceil_char_boundary(content, match_end.saturating_add(CONTEXT_WINDOW));
    let window = content[start..end].to_lowercase();
    CONFIG_CONTEXT_MARKERS.iter().any(|m| window.contains(m))
}

/// Fallback-tier filter: everything `plausible_path` demands, plus
/// rejection of IDE/editor setting keys, bare numbers, and malformed
/// path-like strings that widened file formats surface.
pub fn strictly_plausible(path: &str) -> bool {
    if !plausible_path(path) {
        return false;
    }
    let trimmed = path.trim();
    if trimmed != path {
        return false;
    }
    if path.len() <= 3 {
        return false;
    }
    // IDE macros ($PROJECT_DIR$), URL-scheme values, Windows paths.
    if path.contains('$') || path.contains("://") || path.contains('\\') {
        return false;
    }
    if path.starts_with('.') || path.ends_with('.') {
        return false;
    }
    // Version numbers and bare ports: digits and dots only.
    if path.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }
    true
}
