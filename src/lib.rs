//! perfmap - maps load-test performance metrics onto source-code endpoints
//!
//! This library scans a repository for API endpoint definitions across common
//! web frameworks, grades each endpoint's complexity and risk, and correlates
//! load-test performance profiles with the source locations that serve them.
//!
//! # Core Concepts
//!
//! - **Repository host**: pluggable access to a code repository (local
//!   checkout, in-memory fixture, or a remote service) behind one async trait
//! - **Discovery**: scanning the repository tree and extracting endpoints
//!   with file, line, and function provenance plus static quality metadata
//! - **Matching**: scoring performance profile names against discovered
//!   endpoints with five weighted strategies and a caller-chosen threshold
//!
//! # Example Usage
//!
//! ```ignore
//! use perfmap::{DiscoverOptions, DiscoveryService, EndpointMatcher, PerformanceProfile};
//! use perfmap::repo::{LocalRepository, RepositoryHost};
//! use std::sync::Arc;
//!
//! async fn map_performance(
//!     profiles: Vec<PerformanceProfile>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let host: Arc<dyn RepositoryHost> = Arc::new(LocalRepository::new("."));
//!
//!     let service = DiscoveryService::new()?;
//!     let endpoints = service
//!         .discover(host, "main", &DiscoverOptions::default())
//!         .await?;
//!
//!     let matcher = EndpointMatcher::new()?;
//!     let result = matcher.match_endpoints(&profiles, &endpoints, 0.7)?;
//!
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`repo`]: repository host trait, local and in-memory hosts, retry policy
//! - [`scanner`]: recursive tree walk with deny-lists and extension tiers
//! - [`extract`]: rule-driven endpoint extraction and code context analysis
//! - [`risk`]: pure risk classification from complexity and issue tags
//! - [`matching`]: normalization, scoring strategies, and result assembly
//! - [`discovery`]: the end-to-end pipeline behind one service call

// Public modules
pub mod cli;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod matching;
pub mod model;
pub mod repo;
pub mod risk;
pub mod scanner;
pub mod util;

// Re-export key types for convenient access
pub use config::{ConfigError, MatchWeights, PerfmapConfig};
pub use discovery::{DiscoverOptions, DiscoveryError, DiscoveryService};
pub use extract::{EndpointExtractor, ExtractorError};
pub use matching::{EndpointMatcher, MatchError};
pub use model::{
    DiscoveredEndpoint, IssueTag, MatchResult, MatchStatus, MatchingResult, PerformanceProfile,
    RiskLevel,
};
pub use risk::classify as classify_risk;
pub use scanner::RepositoryScanner;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
