//! Configuration management for perfmap
//!
//! Settings load from environment variables with sensible defaults, so the
//! tool runs unconfigured and still behaves deterministically.
//!
//! # Environment Variables
//!
//! - `PERFMAP_MATCH_THRESHOLD`: Minimum match confidence (0.0-1.0) - default: "0.3"
//! - `PERFMAP_MAX_FILES`: Scan cap per repository - default: "500"
//! - `PERFMAP_MAX_WORKERS`: Concurrent file reads - default: min(4, CPU count)
//! - `PERFMAP_RETRY_ATTEMPTS`: Attempts per repository operation - default: "3"
//! - `PERFMAP_RETRY_BASE_DELAY_MS`: Base backoff delay - default: "1000"
//! - `PERFMAP_CHUNK_LINES`: Chunk size for oversized files - default: "512"
//! - `PERFMAP_CHUNK_OVERLAP`: Overlap between chunks - default: "64"
//! - `PERFMAP_WEIGHT_EXACT` / `_FUZZY` / `_PHRASE` / `_SEMANTIC` / `_FRAMEWORK`:
//!   Strategy weights - defaults: 0.40 / 0.20 / 0.15 / 0.15 / 0.10
//! - `PERFMAP_LOG_LEVEL`: Logging level - default: "info"
//! - `PERFMAP_LOG_JSON`: Emit JSON logs (true|false) - default: "false"

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::repo::RetryPolicy;
use crate::scanner::ScannerConfig;

const DEFAULT_MATCH_THRESHOLD: f64 = 0.3;
const DEFAULT_MAX_FILES: usize = 500;
const DEFAULT_MAX_WORKERS: usize = 4;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_CHUNK_LINES: usize = 512;
const DEFAULT_CHUNK_OVERLAP: usize = 64;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Weights for blending the matching strategies.
///
/// Each weight must sit in [0.0, 1.0] and the vector must sum to at most
/// 1.0, which keeps every blended confidence inside the unit interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub exact: f64,
    pub fuzzy: f64,
    pub phrase: f64,
    pub semantic: f64,
    pub framework: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            exact: 0.40,
            fuzzy: 0.20,
            phrase: 0.15,
            semantic: 0.15,
            framework: 0.10,
        }
    }
}

impl MatchWeights {
    pub fn sum(&self) -> f64 {
        self.exact + self.fuzzy + self.phrase + self.semantic + self.framework
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let components = [
            ("exact", self.exact),
            ("fuzzy", self.fuzzy),
            ("phrase", self.phrase),
            ("semantic", self.semantic),
            ("framework", self.framework),
        ];
        for (name, value) in components {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationFailed(format!(
                    "weight {} must be within [0.0, 1.0], got {}",
                    name, value
                )));
            }
        }
        if self.sum() > 1.0 + 1e-9 {
            return Err(ConfigError::ValidationFailed(format!(
                "strategy weights sum to {:.3}, which exceeds 1.0",
                self.sum()
            )));
        }
        Ok(())
    }
}

/// Main configuration structure for perfmap
///
/// Constructed via `Default::default()`, which reads PERFMAP_* environment
/// variables and falls back to defaults for anything unset or unparsable.
#[derive(Debug, Clone)]
pub struct PerfmapConfig {
    /// Minimum confidence for an endpoint match to be accepted.
    pub match_threshold: f64,

    /// Upper bound on files scanned per repository.
    pub max_files: usize,

    /// Concurrent file reads during discovery.
    pub max_workers: usize,

    /// Attempts per repository operation before giving up.
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between attempts.
    pub retry_base_delay_ms: u64,

    /// Files longer than this are extracted in chunks.
    pub chunk_lines: usize,

    /// Lines shared between consecutive chunks.
    pub chunk_overlap: usize,

    /// Strategy weights for the endpoint matcher.
    pub weights: MatchWeights,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Worker-pool default: up to four readers, never more than the host
/// offers.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(DEFAULT_MAX_WORKERS)
}

impl Default for PerfmapConfig {
    fn default() -> Self {
        let defaults = MatchWeights::default();
        let weights = MatchWeights {
            exact: env_parse("PERFMAP_WEIGHT_EXACT").unwrap_or(defaults.exact),
            fuzzy: env_parse("PERFMAP_WEIGHT_FUZZY").unwrap_or(defaults.fuzzy),
            phrase: env_parse("PERFMAP_WEIGHT_PHRASE").unwrap_or(defaults.phrase),
            semantic: env_parse("PERFMAP_WEIGHT_SEMANTIC").unwrap_or(defaults.semantic),
            framework: env_parse("PERFMAP_WEIGHT_FRAMEWORK").unwrap_or(defaults.framework),
        };

        Self {
            match_threshold: env_parse("PERFMAP_MATCH_THRESHOLD")
                .unwrap_or(DEFAULT_MATCH_THRESHOLD),
            max_files: env_parse("PERFMAP_MAX_FILES").unwrap_or(DEFAULT_MAX_FILES),
            max_workers: env_parse("PERFMAP_MAX_WORKERS").unwrap_or_else(default_worker_count),
            retry_attempts: env_parse("PERFMAP_RETRY_ATTEMPTS").unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            retry_base_delay_ms: env_parse("PERFMAP_RETRY_BASE_DELAY_MS")
                .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
            chunk_lines: env_parse("PERFMAP_CHUNK_LINES").unwrap_or(DEFAULT_CHUNK_LINES),
            chunk_overlap: env_parse("PERFMAP_CHUNK_OVERLAP").unwrap_or(DEFAULT_CHUNK_OVERLAP),
            weights,
            log_level: env::var("PERFMAP_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
            log_json: env_parse("PERFMAP_LOG_JSON").unwrap_or(false),
        }
    }
}

impl PerfmapConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is outside its valid range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ConfigError::ValidationFailed(format!(
                "match threshold must be within [0.0, 1.0], got {}",
                self.match_threshold
            )));
        }
        if self.max_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "max files must be at least 1".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(ConfigError::ValidationFailed(
                "max workers must be at least 1".to_string(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "retry attempts must be at least 1".to_string(),
            ));
        }
        if self.chunk_lines == 0 {
            return Err(ConfigError::ValidationFailed(
                "chunk lines must be at least 1".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_lines {
            return Err(ConfigError::ValidationFailed(format!(
                "chunk overlap ({}) must be smaller than chunk lines ({})",
                self.chunk_overlap, self.chunk_lines
            )));
        }
        self.weights.validate()?;

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Retry policy derived from the configured attempt and delay settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    /// Scanner configuration with this config's file cap applied.
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            max_files: self.max_files,
            ..ScannerConfig::default()
        }
    }
}

impl fmt::Display for PerfmapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Perfmap Configuration:")?;
        writeln!(f, "  Match Threshold: {}", self.match_threshold)?;
        writeln!(f, "  Max Files: {}", self.max_files)?;
        writeln!(f, "  Max Workers: {}", self.max_workers)?;
        writeln!(f, "  Retry Attempts: {}", self.retry_attempts)?;
        writeln!(f, "  Retry Base Delay: {}ms", self.retry_base_delay_ms)?;
        writeln!(
            f,
            "  Chunking: {} lines, {} overlap",
            self.chunk_lines, self.chunk_overlap
        )?;
        writeln!(
            f,
            "  Weights: exact={} fuzzy={} phrase={} semantic={} framework={}",
            self.weights.exact,
            self.weights.fuzzy,
            self.weights.phrase,
            self.weights.semantic,
            self.weights.framework
        )?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
