//! Utility modules for perfmap
//!
//! Currently this is the structured logging setup; anything else shared
//! across the pipeline but owned by no one component belongs here.

pub mod logging;

// Re-export commonly used items
pub use logging::{init_default, init_from_env, init_logging, LoggingConfig};
