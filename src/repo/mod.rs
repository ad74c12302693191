//! Repository host abstraction
//!
//! This module provides the core trait and types for reaching a code
//! repository (e.g., a hosted Git service, a local checkout, an in-memory
//! fixture). All hosts must implement the `RepositoryHost` trait so that
//! scanning and discovery stay independent of where the code lives.
//!
//! HTTP, authentication, and pagination are the host implementation's
//! responsibility; callers only see listings, file contents, and branches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub mod local;
pub mod memory;
pub mod retry;

pub use local::LocalRepository;
pub use memory::InMemoryRepository;
pub use retry::{RetryError, RetryPolicy};

/// Errors that can occur during host operations
#[derive(Debug, Error)]
pub enum HostError {
    /// The host throttled the caller; retryable after a backoff.
    #[error("rate limited by repository host")]
    RateLimited { retry_after: Option<Duration> },

    /// The path does not exist at the requested ref; terminal for that path.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure; retryable.
    #[error("network error: {0}")]
    Network(String),

    /// Underlying I/O failure for filesystem-backed hosts.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    /// Whether a retry with backoff could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, HostError::RateLimited { .. } | HostError::Network(_))
    }

    /// Host-suggested wait before the next attempt, if it gave one.
    pub fn retry_hint(&self) -> Option<Duration> {
        match self {
            HostError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry of a directory listing, with a repository-relative path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
}

impl RemoteEntry {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
            size: 0,
        }
    }

    /// Final path component, used against directory deny-lists.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Core trait every repository host must implement
///
/// Paths are repository-relative with `/` separators; the empty string
/// denotes the repository root. `git_ref` names a branch, tag, or commit —
/// hosts without ref support (plain directories) may ignore it.
///
/// # Example
///
/// ```ignore
/// use perfmap::repo::{RepositoryHost, InMemoryRepository};
///
/// async fn count_root_entries(host: &impl RepositoryHost) -> usize {
///     host.list_directory("", "main").await.map(|e| e.len()).unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// List the immediate children of a directory.
    ///
    /// # Errors
    ///
    /// Returns `HostError::NotFound` when the directory itself is absent,
    /// and transient variants for throttling or transport failures.
    async fn list_directory(&self, path: &str, git_ref: &str)
        -> Result<Vec<RemoteEntry>, HostError>;

    /// Read a file's raw bytes, or `None` when the file does not exist at
    /// the given ref. Absence is an expected outcome, not an error.
    async fn read_file(&self, path: &str, git_ref: &str) -> Result<Option<Vec<u8>>, HostError>;

    /// Branch names known to the host. Hosts without branch metadata return
    /// an empty list.
    async fn list_branches(&self) -> Result<Vec<String>, HostError>;
}
