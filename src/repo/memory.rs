//! Deterministic in-memory repository host for tests and embedders.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{HostError, RemoteEntry, RepositoryHost};

/// A repository held entirely in memory. Listing order is the sorted key
/// order, so scans over it are fully deterministic.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    files: BTreeMap<String, Vec<u8>>,
    branches: Vec<String>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with_branch(mut self, name: impl Into<String>) -> Self {
        self.branches.push(name.into());
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.files.keys().any(|k| k.starts_with(prefix))
    }
}

#[async_trait]
impl RepositoryHost for InMemoryRepository {
    async fn list_directory(
        &self,
        path: &str,
        _git_ref: &str,
    ) -> Result<Vec<RemoteEntry>, HostError> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };
        if !prefix.is_empty() && !self.has_prefix(&prefix) {
            return Err(HostError::NotFound(path.to_string()));
        }

        // Directories are implied by deeper keys; emit each child once.
        let mut entries: BTreeMap<String, RemoteEntry> = BTreeMap::new();
        for (key, content) in &self.files {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    let child_path = format!("{}{}", prefix, child);
                    entries
                        .entry(child_path.clone())
                        .or_insert_with(|| RemoteEntry::dir(child_path));
                }
                None => {
                    entries.insert(
                        key.clone(),
                        RemoteEntry::file(key.clone(), content.len() as u64),
                    );
                }
            }
        }
        Ok(entries.into_values().collect())
    }

    async fn read_file(&self, path: &str, _git_ref: &str) -> Result<Option<Vec<u8>>, HostError> {
        Ok(self.files.get(path).cloned())
    }

    async fn list_branches(&self) -> Result<Vec<String>, HostError> {
        Ok(self.branches.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_file("src/api/users.py", "@app.get(\"/users\")")
            .with_file("src/api/orders.py", "@app.post(\"/orders\")")
            .with_file("README.md", "# demo")
            .with_branch("main")
    }

    #[tokio::test]
    async fn test_root_listing_implies_directories() {
        let host = sample();
        let entries = host.list_directory("", "main").await.unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "src"]);
        assert!(entries[1].is_dir());
    }

    #[tokio::test]
    async fn test_nested_listing() {
        let host = sample();
        let entries = host.list_directory("src/api", "main").await.unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["src/api/orders.py", "src/api/users.py"]);
    }

    #[tokio::test]
    async fn test_read_and_branches() {
        let host = sample();
        assert!(host.read_file("README.md", "main").await.unwrap().is_some());
        assert!(host.read_file("missing.py", "main").await.unwrap().is_none());
        assert_eq!(host.list_branches().await.unwrap(), vec!["main"]);
    }

    #[tokio::test]
    async fn test_unknown_directory_errors() {
        let host = sample();
        assert!(matches!(
            host.list_directory("lib", "main").await,
            Err(HostError::NotFound(_))
        ));
    }
}
