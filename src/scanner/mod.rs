//! Candidate source-file discovery over a repository host.
//!
//! The scanner walks the repository tree breadth-first per directory, prunes
//! dependency caches, build output, and IDE settings, drops manifests and
//! lock files, and keeps only files whose extension belongs to the active
//! allow-list tier. Every host call goes through the retry policy.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::discovery::DiscoveryError;
use crate::repo::{HostError, RepositoryHost, RetryError, RetryPolicy};

pub const DEFAULT_MAX_FILES: usize = 500;

/// Directory names never descended into.
const DENY_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "venv",
    ".venv",
    "env",
    "bin",
    "obj",
    "packages",
    "target",
    "build",
    "dist",
    "out",
    ".idea",
    ".vscode",
    "vendor",
    "coverage",
];

/// Manifests and lock files: never route declarations, frequently huge.
const DENY_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "Gemfile.lock",
    "composer.lock",
    "poetry.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "requirements.txt",
    "package.json",
    "Cargo.toml",
    "composer.json",
    "Gemfile",
    "go.mod",
    "go.sum",
];

/// Extensions scanned by the high-precision primary pass.
const PRIMARY_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "java", "cs", "rb", "go", "rs", "php", "kt", "kts", "scala",
    "swift",
];

/// Extra extensions admitted only by the widened fallback pass.
const WIDENED_EXTENSIONS: &[&str] = &[
    "yaml", "yml", "json", "xml", "toml", "ini", "cfg", "conf", "properties",
];

/// Which allow-list tier a scan runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTier {
    /// Programming-language extensions only.
    Primary,
    /// Primary set plus configuration/markup formats.
    Widened,
}

/// A file selected for extraction, with its repository-relative path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub size: u64,
}

/// Filtering tables and limits for a repository walk.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub deny_dirs: Vec<String>,
    pub deny_files: Vec<String>,
    pub extensions: Vec<String>,
    pub widened_extensions: Vec<String>,
    /// Upper bound on files handed to extraction; exceeding it truncates
    /// the scan with a warning, it is not an error.
    pub max_files: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            deny_dirs: DENY_DIRS.iter().map(|s| s.to_string()).collect(),
            deny_files: DENY_FILES.iter().map(|s| s.to_string()).collect(),
            extensions: PRIMARY_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            widened_extensions: WIDENED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl ScannerConfig {
    fn extension_allowed(&self, path: &str, tier: ScanTier) -> bool {
        let ext = match path.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => return false,
        };
        if self.extensions.iter().any(|e| *e == ext) {
            return true;
        }
        tier == ScanTier::Widened && self.widened_extensions.iter().any(|e| *e == ext)
    }

    fn is_candidate(&self, path: &str, tier: ScanTier) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        if self.deny_files.iter().any(|f| f == name) {
            return false;
        }
        self.extension_allowed(name, tier)
    }
}

/// Walks a repository host and returns the candidate files in a stable
/// depth-first order.
pub struct RepositoryScanner {
    config: ScannerConfig,
    retry: RetryPolicy,
}

impl RepositoryScanner {
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default(), RetryPolicy::default())
    }

    pub fn with_config(config: ScannerConfig, retry: RetryPolicy) -> Self {
        Self { config, retry }
    }

    /// Recursively lists candidate source files under the repository root.
    ///
    /// Transient host failures are retried; exhaustion surfaces as
    /// `DiscoveryError::RepositoryUnavailable`. A directory that disappears
    /// mid-walk is skipped, matching the single-file not-found rule.
    pub async fn list_files(
        &self,
        host: &dyn RepositoryHost,
        git_ref: &str,
        tier: ScanTier,
    ) -> Result<Vec<SourceFile>, DiscoveryError> {
        let mut files = Vec::new();
        // Stack of directories still to visit; children are pushed in
        // reverse-sorted order so the walk pops them lexicographically.
        let mut pending = vec![String::new()];
        let mut truncated = false;

        'walk: while let Some(dir) = pending.pop() {
            let listing = match self
                .retry
                .run("list_directory", || host.list_directory(&dir, git_ref))
                .await
            {
                Ok(listing) => listing,
                Err(RetryError::Terminal(HostError::NotFound(path))) => {
                    if dir.is_empty() {
                        return Err(DiscoveryError::RootNotFound(path));
                    }
                    warn!(directory = %dir, "directory vanished during scan, skipping");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let mut subdirs = Vec::new();
            for entry in listing {
                if entry.is_dir() {
                    let name = entry.name();
                    if self.config.deny_dirs.iter().any(|d| d == name) {
                        debug!(directory = %entry.path, "pruned");
                        continue;
                    }
                    subdirs.push(entry.path);
                } else if self.config.is_candidate(&entry.path, tier) {
                    files.push(SourceFile {
                        path: entry.path,
                        size: entry.size,
                    });
                    if files.len() >= self.config.max_files {
                        truncated = true;
                        break 'walk;
                    }
                }
            }
            subdirs.sort();
            while let Some(sub) = subdirs.pop() {
                pending.push(sub);
            }
        }

        if truncated {
            warn!(
                limit = self.config.max_files,
                "file limit reached, remaining directories were not scanned"
            );
        }
        debug!(count = files.len(), ?tier, "scan complete");
        Ok(files)
    }
}

impl Default for RepositoryScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::InMemoryRepository;

    fn sample_repo() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_file("src/api/users.py", "@app.get(\"/users\")")
            .with_file("src/api/orders.js", "app.get('/orders')")
            .with_file("src/notes.txt", "not code")
            .with_file("node_modules/lib/index.js", "module.exports = {}")
            .with_file("config/settings.yaml", "port: 8080")
            .with_file("package.json", "{}")
            .with_file("requirements.txt", "flask")
    }

    #[tokio::test]
    async fn test_primary_scan_filters_and_prunes() {
        let scanner = RepositoryScanner::new();
        let files = scanner
            .list_files(&sample_repo(), "main", ScanTier::Primary)
            .await
            .unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["src/api/orders.js", "src/api/users.py"]);
    }

    #[tokio::test]
    async fn test_widened_scan_admits_config_formats() {
        let scanner = RepositoryScanner::new();
        let files = scanner
            .list_files(&sample_repo(), "main", ScanTier::Widened)
            .await
            .unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();

        assert!(paths.contains(&"config/settings.yaml"));
        // Lock files and manifests stay denied even when widened.
        assert!(!paths.contains(&"package.json"));
        assert!(!paths.contains(&"requirements.txt"));
    }

    #[tokio::test]
    async fn test_max_files_truncates_without_error() {
        let config = ScannerConfig {
            max_files: 1,
            ..ScannerConfig::default()
        };
        let scanner = RepositoryScanner::with_config(config, RetryPolicy::default());
        let files = scanner
            .list_files(&sample_repo(), "main", ScanTier::Primary)
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_walk_order_is_stable() {
        let scanner = RepositoryScanner::new();
        let host = sample_repo();
        let first = scanner
            .list_files(&host, "main", ScanTier::Primary)
            .await
            .unwrap();
        let second = scanner
            .list_files(&host, "main", ScanTier::Primary)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extensionless_and_dotfiles_are_skipped() {
        let config = ScannerConfig::default();
        assert!(!config.is_candidate("Makefile", ScanTier::Primary));
        assert!(!config.is_candidate(".gitignore", ScanTier::Primary));
        assert!(config.is_candidate("src/App.TSX", ScanTier::Primary));
    }
}
