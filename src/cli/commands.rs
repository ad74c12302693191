//! Command-line interface: argument definitions and command handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::PerfmapConfig;
use crate::discovery::{DiscoverOptions, DiscoveryService};
use crate::matching::EndpointMatcher;
use crate::model::{DiscoveredEndpoint, PerformanceProfile};
use crate::repo::{LocalRepository, RepositoryHost};

use super::output::{OutputFormat, OutputFormatter};

/// Maps load-test performance metrics onto the source code that serves them
#[derive(Parser, Debug)]
#[command(
    name = "perfmap",
    about = "Maps load-test performance metrics onto the source-code endpoints that implement them",
    version,
    author,
    long_about = "perfmap scans a repository for API endpoint definitions across common \
                  web frameworks, grades each endpoint's complexity and risk, and \
                  correlates load-test performance profiles with the source locations \
                  that serve them."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug logging)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Discover API endpoints in a repository",
        long_about = "Scans the repository tree for route definitions across common web \
                      frameworks and reports each endpoint with its source location, \
                      complexity score, and risk level.\n\n\
                      Examples:\n  \
                      perfmap discover\n  \
                      perfmap discover /path/to/repo\n  \
                      perfmap discover --format json -o endpoints.json"
    )]
    Discover(DiscoverArgs),

    #[command(
        about = "Match performance profiles against discovered endpoints",
        long_about = "Discovers endpoints, then correlates the performance profiles in a \
                      JSON file with them and reports per-profile confidence.\n\n\
                      Examples:\n  \
                      perfmap analyze --profiles load-test.json\n  \
                      perfmap analyze /path/to/repo -p load-test.json --threshold 0.8"
    )]
    Analyze(AnalyzeArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DiscoverArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        long = "ref",
        value_name = "REF",
        default_value = "main",
        help = "Branch, tag, or commit to scan"
    )]
    pub git_ref: String,

    #[arg(
        long,
        help = "Skip the widened fallback pass when the primary scan finds nothing"
    )]
    pub no_fallback: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'p',
        long,
        value_name = "FILE",
        help = "JSON file with performance profiles (array or single object)"
    )]
    pub profiles: PathBuf,

    #[arg(
        long = "ref",
        value_name = "REF",
        default_value = "main",
        help = "Branch, tag, or commit to scan"
    )]
    pub git_ref: String,

    #[arg(
        short = 't',
        long,
        value_name = "SCORE",
        help = "Minimum confidence for an accepted match, 0.0-1.0 (defaults to configuration)"
    )]
    pub threshold: Option<f64>,

    #[arg(
        long,
        help = "Skip the widened fallback pass when the primary scan finds nothing"
    )]
    pub no_fallback: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Text,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

pub async fn handle_discover(args: &DiscoverArgs, quiet: bool) -> i32 {
    info!("Starting endpoint discovery");

    let config = PerfmapConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your PERFMAP_* environment variables.");
        return 1;
    }

    let endpoints = match run_discovery(
        args.repository_path.as_deref(),
        &args.git_ref,
        !args.no_fallback,
        &config,
    )
    .await
    {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!("Discovery failed: {:#}", e);
            return 1;
        }
    };

    info!("Discovery complete: {} endpoints found", endpoints.len());

    let format: OutputFormat = args.format.into();
    let formatter = OutputFormatter::new(format);
    let output = match formatter.format_discovery(&endpoints) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {}", e);
            return 1;
        }
    };

    write_output(&output, args.output.as_deref(), quiet)
}

pub async fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    info!("Starting performance analysis");

    let config = PerfmapConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your PERFMAP_* environment variables.");
        return 1;
    }

    let profiles = match load_profiles(&args.profiles) {
        Ok(profiles) => profiles,
        Err(e) => {
            error!("Failed to load profiles: {:#}", e);
            return 1;
        }
    };
    info!("Loaded {} performance profiles", profiles.len());

    let endpoints = match run_discovery(
        args.repository_path.as_deref(),
        &args.git_ref,
        !args.no_fallback,
        &config,
    )
    .await
    {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!("Discovery failed: {:#}", e);
            return 1;
        }
    };
    info!("Discovery complete: {} endpoints found", endpoints.len());

    let threshold = args.threshold.unwrap_or(config.match_threshold);
    let matcher = match EndpointMatcher::with_weights(config.weights) {
        Ok(matcher) => matcher,
        Err(e) => {
            error!("Failed to build the endpoint matcher: {}", e);
            return 1;
        }
    };

    let result = match matcher.match_endpoints(&profiles, &endpoints, threshold) {
        Ok(result) => result,
        Err(e) => {
            error!("Matching failed: {}", e);
            return 1;
        }
    };
    info!("{}", result);

    let format: OutputFormat = args.format.into();
    let formatter = OutputFormatter::new(format);
    let output = match formatter.format_matching(&result) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {}", e);
            return 1;
        }
    };

    write_output(&output, args.output.as_deref(), quiet)
}

async fn run_discovery(
    repository_path: Option<&Path>,
    git_ref: &str,
    fallback_enabled: bool,
    config: &PerfmapConfig,
) -> Result<Vec<DiscoveredEndpoint>> {
    let repo_path = resolve_repo_path(repository_path)?;
    info!("Analyzing repository: {}", repo_path.display());

    let service = DiscoveryService::with_config(config.clone())
        .context("failed to initialize the endpoint extractor")?;
    let host: Arc<dyn RepositoryHost> = Arc::new(LocalRepository::new(repo_path));
    let options = DiscoverOptions {
        fallback_enabled,
        ..DiscoverOptions::default()
    };

    service
        .discover(host, git_ref, &options)
        .await
        .context("endpoint discovery failed")
}

fn resolve_repo_path(path: Option<&Path>) -> Result<PathBuf> {
    let repo_path = match path {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("failed to resolve the current directory")?,
    };
    debug!("Repository path: {}", repo_path.display());

    if !repo_path.exists() {
        anyhow::bail!("repository path does not exist: {}", repo_path.display());
    }
    if !repo_path.is_dir() {
        anyhow::bail!("repository path is not a directory: {}", repo_path.display());
    }
    repo_path
        .canonicalize()
        .with_context(|| format!("failed to canonicalize {}", repo_path.display()))
}

/// Accepts either an array of profiles or a single profile object.
fn load_profiles(path: &Path) -> Result<Vec<PerformanceProfile>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    match serde_json::from_str::<Vec<PerformanceProfile>>(&content) {
        Ok(profiles) => Ok(profiles),
        Err(_) => serde_json::from_str::<PerformanceProfile>(&content)
            .map(|profile| vec![profile])
            .with_context(|| {
                format!("{} is not a performance profile document", path.display())
            }),
    }
}

fn write_output(output: &str, destination: Option<&Path>, quiet: bool) -> i32 {
    if let Some(path) = destination {
        match std::fs::write(path, output) {
            Ok(_) => {
                info!("Output written to: {}", path.display());
                if !quiet {
                    println!("Output written to: {}", path.display());
                }
                0
            }
            Err(e) => {
                error!("Failed to write output to {}: {}", path.display(), e);
                1
            }
        }
    } else {
        println!("{}", output);
        0
    }
}
