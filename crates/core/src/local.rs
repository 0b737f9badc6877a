//! Host filesystem backend
//!
//! [`LocalFs`] maps logical paths onto a directory of the host filesystem
//! and delegates every operation to `tokio::fs`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::path::VPath;
use crate::traits::{FileMetadata, FileSystem, Source};

/// Read-write backend rooted at a host directory
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Create a backend rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Backend covering the whole host filesystem
    pub fn host() -> Self {
        Self::new("/")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path for a logical path
    pub fn host_path(&self, path: &VPath) -> PathBuf {
        if path.is_root() {
            self.root.clone()
        } else {
            self.root.join(path.relative())
        }
    }

    /// Metadata for a host path, `None` when it does not exist
    pub(crate) async fn stat_host(host: &Path) -> Result<Option<FileMetadata>> {
        let meta = match tokio::fs::metadata(host).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| Timestamp::try_from(t).ok());
        let info = if meta.is_dir() {
            FileMetadata::directory()
        } else {
            FileMetadata::file(meta.len())
        };
        Ok(Some(info.with_modified(modified)))
    }

    /// Child names of a host directory, sorted
    pub(crate) async fn read_dir_names(host: &Path) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(host)
            .await
            .map_err(|e| Error::from_io(e, host.display()))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    async fn canonicalize(&self, path: &VPath) -> Result<VPath> {
        let host = self.host_path(path);
        tokio::fs::metadata(&host)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        Ok(path.clone())
    }

    async fn list(&self, dir: &VPath) -> Result<Vec<VPath>> {
        let host = self.host_path(dir);
        tracing::debug!(dir = %dir, host = %host.display(), "listing local directory");
        let names = Self::read_dir_names(&host)
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound(dir.to_string()),
                other => other,
            })?;
        Ok(names.iter().map(|n| dir.join(n)).collect())
    }

    async fn metadata_or_none(&self, path: &VPath) -> Result<Option<FileMetadata>> {
        Self::stat_host(&self.host_path(path)).await
    }

    async fn source(&self, path: &VPath) -> Result<Source> {
        let file = tokio::fs::File::open(self.host_path(path))
            .await
            .map_err(|e| Error::from_io(e, path))?;
        Ok(Box::pin(file))
    }

    async fn sink(&self, path: &VPath, data: Vec<u8>) -> Result<()> {
        tokio::fs::write(self.host_path(path), data)
            .await
            .map_err(|e| Error::from_io(e, path))
    }

    async fn appending_sink(&self, path: &VPath, data: Vec<u8>) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.host_path(path))
            .await
            .map_err(|e| Error::from_io(e, path))?;
        file.write_all(&data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn atomic_move(&self, source: &VPath, target: &VPath) -> Result<()> {
        tokio::fs::rename(self.host_path(source), self.host_path(target))
            .await
            .map_err(|e| Error::from_io(e, source))
    }

    async fn delete(&self, path: &VPath) -> Result<()> {
        let host = self.host_path(path);
        let meta = tokio::fs::metadata(&host)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        if meta.is_dir() {
            tokio::fs::remove_dir(&host).await?;
        } else {
            tokio::fs::remove_file(&host).await?;
        }
        Ok(())
    }

    async fn create_directory(&self, dir: &VPath) -> Result<()> {
        tokio::fs::create_dir_all(self.host_path(dir)).await?;
        Ok(())
    }

    async fn to_system_path(&self, path: &VPath) -> Result<Option<PathBuf>> {
        Ok(Some(self.host_path(path)))
    }
}
