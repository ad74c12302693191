//! Endpoint discovery pipeline.
//!
//! Scans a repository host for candidate files, reads them through a
//! bounded worker pool, and runs extraction over the contents. Workers are
//! awaited in spawn order, so the aggregated result is deterministic for a
//! given repository state no matter how reads interleave.

use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::PerfmapConfig;
use crate::extract::{EndpointExtractor, ExtractionMode, ExtractorError};
use crate::model::DiscoveredEndpoint;
use crate::repo::{HostError, RepositoryHost, RetryError, RetryPolicy};
use crate::scanner::{RepositoryScanner, ScanTier, SourceFile};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Transient failures persisted through every retry attempt.
    #[error("repository unavailable after {attempts} attempts: {source}")]
    RepositoryUnavailable {
        attempts: u32,
        #[source]
        source: HostError,
    },

    /// The repository root itself cannot be listed: wrong ref or repo.
    #[error("repository root not found: {0}")]
    RootNotFound(String),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    #[error("discovery worker failed: {0}")]
    Worker(String),
}

impl From<RetryError> for DiscoveryError {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::Exhausted { attempts, source } => {
                DiscoveryError::RepositoryUnavailable { attempts, source }
            }
            RetryError::Terminal(source) => DiscoveryError::Host(source),
        }
    }
}

/// Caller-tunable behavior for one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Run the widened fallback pass when the primary pass finds nothing.
    pub fallback_enabled: bool,
    /// Endpoints reported when even the fallback finds nothing, so a
    /// downstream matching run still has candidates. Empty disables
    /// synthesis.
    pub sample_endpoints: Vec<String>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            sample_endpoints: Vec::new(),
        }
    }
}

/// Scans repositories and extracts their API endpoints.
pub struct DiscoveryService {
    scanner: RepositoryScanner,
    extractor: Arc<EndpointExtractor>,
    retry: RetryPolicy,
    config: PerfmapConfig,
}

impl DiscoveryService {
    pub fn new() -> Result<Self, ExtractorError> {
        Self::with_config(PerfmapConfig::default())
    }

    pub fn with_config(config: PerfmapConfig) -> Result<Self, ExtractorError> {
        let retry = config.retry_policy();
        Ok(Self {
            scanner: RepositoryScanner::with_config(config.scanner_config(), retry.clone()),
            extractor: Arc::new(EndpointExtractor::new()?),
            retry,
            config,
        })
    }

    /// Picks the ref to scan: the requested ref when the host lists it,
    /// then `main`, then `master`, then the first listed branch. Hosts
    /// that report no branches leave the request unchanged.
    pub async fn resolve_ref(&self, host: &dyn RepositoryHost, requested: &str) -> String {
        let branches = match self
            .retry
            .run("list_branches", || host.list_branches())
            .await
        {
            Ok(branches) => branches,
            Err(err) => {
                warn!(error = %err, "branch listing failed, keeping requested ref");
                return requested.to_string();
            }
        };
        if branches.is_empty() || branches.iter().any(|b| b == requested) {
            return requested.to_string();
        }
        for fallback in ["main", "master"] {
            if branches.iter().any(|b| b == fallback) {
                debug!(requested, resolved = fallback, "requested ref not found");
                return fallback.to_string();
            }
        }
        debug!(requested, resolved = %branches[0], "requested ref not found");
        branches[0].clone()
    }

    /// Discovers every API endpoint reachable from the repository root.
    ///
    /// Files listed by the scan but missing at read time are skipped, as
    /// is anything that fails UTF-8 decoding. Endpoints repeated within
    /// one file keep their first occurrence.
    pub async fn discover(
        &self,
        host: Arc<dyn RepositoryHost>,
        git_ref: &str,
        options: &DiscoverOptions,
    ) -> Result<Vec<DiscoveredEndpoint>, DiscoveryError> {
        let git_ref = self.resolve_ref(host.as_ref(), git_ref).await;
        info!(git_ref = %git_ref, "starting endpoint discovery");

        let files = self
            .scanner
            .list_files(host.as_ref(), &git_ref, ScanTier::Primary)
            .await?;
        let mut endpoints = self
            .run_pass(&host, &git_ref, files, ExtractionMode::Primary)
            .await?;

        if endpoints.is_empty() && options.fallback_enabled {
            info!("primary pass found nothing, widening the scan");
            let widened = self
                .scanner
                .list_files(host.as_ref(), &git_ref, ScanTier::Widened)
                .await?;
            endpoints = self
                .run_pass(&host, &git_ref, widened, ExtractionMode::Fallback)
                .await?;
        }

        if endpoints.is_empty() && !options.sample_endpoints.is_empty() {
            warn!(
                count = options.sample_endpoints.len(),
                "nothing discovered, reporting caller-provided samples"
            );
            endpoints = options
                .sample_endpoints
                .iter()
                .map(|e| synthetic_endpoint(e))
                .collect();
        }

        info!(count = endpoints.len(), "discovery complete");
        Ok(endpoints)
    }

    async fn run_pass(
        &self,
        host: &Arc<dyn RepositoryHost>,
        git_ref: &str,
        files: Vec<SourceFile>,
        mode: ExtractionMode,
    ) -> Result<Vec<DiscoveredEndpoint>, DiscoveryError> {
        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let workers = self.config.max_workers.clamp(1, hardware);
        let semaphore = Arc::new(Semaphore::new(workers));
        debug!(files = files.len(), workers, ?mode, "reading candidate files");

        let mut handles = Vec::with_capacity(files.len());
        for file in files {
            let host = Arc::clone(host);
            let semaphore = Arc::clone(&semaphore);
            let extractor = Arc::clone(&self.extractor);
            let retry = self.retry.clone();
            let git_ref = git_ref.to_string();
            let chunk_lines = self.config.chunk_lines;
            let chunk_overlap = self.config.chunk_overlap;
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| DiscoveryError::Worker(e.to_string()))?;
                read_and_extract(
                    host,
                    retry,
                    extractor,
                    file,
                    git_ref,
                    chunk_lines,
                    chunk_overlap,
                    mode,
                )
                .await
            }));
        }

        // join_all yields results in spawn order, which keeps
        // first-occurrence dedup independent of read completion order.
        let mut seen: HashSet<String> = HashSet::new();
        let mut endpoints = Vec::new();
        for joined in join_all(handles).await {
            let batch = joined.map_err(|e| DiscoveryError::Worker(e.to_string()))??;
            for endpoint in batch {
                if seen.insert(endpoint.dedup_key()) {
                    endpoints.push(endpoint);
                }
            }
        }
        Ok(endpoints)
    }
}

#[allow(clippy::too_many_arguments)]
async fn read_and_extract(
    host: Arc<dyn RepositoryHost>,
    retry: RetryPolicy,
    extractor: Arc<EndpointExtractor>,
    file: SourceFile,
    git_ref: String,
    chunk_lines: usize,
    chunk_overlap: usize,
    mode: ExtractionMode,
) -> Result<Vec<DiscoveredEndpoint>, DiscoveryError> {
    let bytes = match retry
        .run("read_file", || host.read_file(&file.path, &git_ref))
        .await
    {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(file = %file.path, "file absent at read time, skipped");
            return Ok(Vec::new());
        }
        Err(RetryError::Terminal(HostError::NotFound(_))) => {
            debug!(file = %file.path, "file vanished between scan and read, skipped");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(_) => {
            warn!(file = %file.path, "not valid UTF-8, skipped");
            return Ok(Vec::new());
        }
    };

    let endpoints =
        extractor.extract_chunked(&file.path, &content, chunk_lines, chunk_overlap, mode);
    if !endpoints.is_empty() {
        debug!(file = %file.path, count = endpoints.len(), "endpoints extracted");
    }
    Ok(endpoints)
}

/// Placeholder endpoint reported when discovery comes up empty and the
/// caller supplied samples.
fn synthetic_endpoint(endpoint: &str) -> DiscoveredEndpoint {
    DiscoveredEndpoint::new(endpoint, "synthetic", 0)
}
