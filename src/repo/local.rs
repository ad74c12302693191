//! Repository host backed by a local checkout.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

use super::{EntryKind, HostError, RemoteEntry, RepositoryHost};

/// Serves a plain directory tree through the host contract. Refs are
/// ignored: a checkout is already pinned to one revision.
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    fn io_error(path: &str, source: io::Error) -> HostError {
        HostError::Io {
            path: PathBuf::from(path),
            source,
        }
    }

    fn join_relative(parent: &str, name: &str) -> String {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent, name)
        }
    }
}

#[async_trait]
impl RepositoryHost for LocalRepository {
    async fn list_directory(
        &self,
        path: &str,
        _git_ref: &str,
    ) -> Result<Vec<RemoteEntry>, HostError> {
        let full = self.resolve(path);
        let mut reader = match tokio::fs::read_dir(&full).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(HostError::NotFound(path.to_string()))
            }
            Err(err) => return Err(Self::io_error(path, err)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|err| Self::io_error(path, err))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let meta = entry
                .metadata()
                .await
                .map_err(|err| Self::io_error(path, err))?;
            let relative = Self::join_relative(path, &name);
            let kind = if meta.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            entries.push(RemoteEntry {
                path: relative,
                kind,
                size: meta.len(),
            });
        }

        // read_dir order is platform-dependent; sort for stable scans.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn read_file(&self, path: &str, _git_ref: &str) -> Result<Option<Vec<u8>>, HostError> {
        match tokio::fs::read(self.resolve(path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error(path, err)),
        }
    }

    async fn list_branches(&self) -> Result<Vec<String>, HostError> {
        Ok(Vec::new())
    }
}
