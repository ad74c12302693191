//! Structured logging setup for perfmap
//!
//! Initialization and configuration for structured logging on the `tracing`
//! ecosystem: console output by default, optional JSON lines for pipelines,
//! and runtime filtering through `RUST_LOG`.
//!
//! Results are written to stdout by the CLI, so every log line goes to
//! stderr regardless of format.
//!
//! # Example
//!
//! ```no_run
//! use perfmap::util::logging;
//!
//! // Initialize with default configuration
//! logging::init_default();
//!
//! // Or initialize from environment variables
//! logging::init_from_env();
//!
//! // Now use tracing macros throughout your code
//! use tracing::{debug, info, warn};
//!
//! info!("discovery starting");
//! debug!(file = "src/api/users.py", "extracting endpoints");
//! warn!(attempt = 2, "repository host rate limited, backing off");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::PerfmapConfig;

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format (for structured logging in pipelines)
    pub use_json: bool,

    /// Include the module target (e.g., perfmap::discovery) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    /// INFO level, pretty console output, module targets on, location and
    /// thread metadata off.
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a logging configuration with the specified level
    ///
    /// # Example
    ///
    /// ```
    /// use perfmap::util::LoggingConfig;
    /// use tracing::Level;
    ///
    /// let config = LoggingConfig::with_level(Level::DEBUG);
    /// ```
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

impl From<&PerfmapConfig> for LoggingConfig {
    /// Derives logging settings from the application configuration, so one
    /// `PERFMAP_*` environment carries both.
    fn from(config: &PerfmapConfig) -> Self {
        Self {
            level: parse_level(&config.log_level),
            use_json: config.log_json,
            // JSON consumers want provenance; console readers do not.
            include_location: config.log_json,
            include_thread_ids: config.log_json,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string, case-insensitively.
///
/// Unknown names fall back to `Level::INFO` with a note on stderr.
///
/// # Example
///
/// ```
/// use perfmap::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Initializes the logging system with the provided configuration
///
/// Sets up the `tracing` subscriber once; subsequent calls are ignored, so
/// it is safe to call from both a binary and embedding tests.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        // The crate directive applies beneath whatever RUST_LOG requests.
        let filter = EnvFilter::from_default_env()
            .add_directive(format!("perfmap={}", config.level).parse().unwrap());

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

/// Initializes logging with default configuration
///
/// # Example
///
/// ```no_run
/// use perfmap::util::logging;
///
/// logging::init_default();
/// ```
pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from environment variables
///
/// Reads `PERFMAP_LOG_LEVEL` (trace, debug, info, warn, error) and
/// `PERFMAP_LOG_JSON` (true/false); `RUST_LOG` is honored on top as usual.
/// Anything unset falls back to the defaults.
///
/// # Example
///
/// ```no_run
/// use perfmap::util::logging;
///
/// // With environment: PERFMAP_LOG_LEVEL=debug
/// logging::init_from_env();
/// ```
pub fn init_from_env() {
    let level_str = env::var("PERFMAP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level = parse_level(&level_str);

    let use_json = env::var("PERFMAP_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    let config = LoggingConfig {
        level,
        use_json,
        ..Default::default()
    };

    init_logging(config);
}
