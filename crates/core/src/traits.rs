//! Facade and collaborator traits
//!
//! [`FileSystem`] is the capability contract every adapter implements.
//! Read-only adapters fail write operations with [`Error::ReadOnly`].
//!
//! [`ObjectStore`] is the SDK-independent object-store client the
//! object-store adapter delegates to, so it can be exercised against mocks.

use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};
use crate::path::VPath;

/// Readable byte stream returned by [`FileSystem::source`]
pub type Source = Pin<Box<dyn AsyncRead + Send>>;

/// Wrap an in-memory body as a [`Source`]
pub fn memory_source(data: Vec<u8>) -> Source {
    Box::pin(std::io::Cursor::new(data))
}

/// Entry kind reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Metadata for a file or directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    pub kind: EntryKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileMetadata {
    /// Metadata for a regular file of known size
    pub fn file(size: u64) -> Self {
        Self {
            kind: EntryKind::File,
            size: Some(size),
            modified: None,
            etag: None,
            content_type: None,
        }
    }

    /// Metadata for a directory
    pub fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            size: None,
            modified: None,
            etag: None,
            content_type: None,
        }
    }

    pub fn with_modified(mut self, modified: Option<Timestamp>) -> Self {
        self.modified = modified;
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Path-addressable filesystem facade
///
/// All paths are logical [`VPath`]s. Adapters implement the subset their
/// backend supports and report the rest as [`Error::Unsupported`] or
/// [`Error::ReadOnly`].
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Normalize a path to its absolute, backend-accepted form
    async fn canonicalize(&self, path: &VPath) -> Result<VPath>;

    /// List the children of a directory as full paths, sorted
    async fn list(&self, dir: &VPath) -> Result<Vec<VPath>>;

    /// Metadata for a path, `None` when it does not exist
    async fn metadata_or_none(&self, path: &VPath) -> Result<Option<FileMetadata>>;

    /// Open a file for reading
    async fn source(&self, path: &VPath) -> Result<Source>;

    /// Create or replace a file with `data`
    async fn sink(&self, path: &VPath, data: Vec<u8>) -> Result<()>;

    /// Append `data` to a file, creating it if needed
    async fn appending_sink(&self, path: &VPath, data: Vec<u8>) -> Result<()>;

    /// Move `source` to `target`
    async fn atomic_move(&self, source: &VPath, target: &VPath) -> Result<()>;

    /// Remove a file or an empty directory
    async fn delete(&self, path: &VPath) -> Result<()>;

    /// Create a directory
    async fn create_directory(&self, dir: &VPath) -> Result<()>;

    /// Best-effort mapping onto a host filesystem path
    async fn to_system_path(&self, _path: &VPath) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    /// Metadata for a path, failing with [`Error::NotFound`] when absent
    async fn metadata(&self, path: &VPath) -> Result<FileMetadata> {
        self.metadata_or_none(path)
            .await?
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    /// Read a whole file into memory
    async fn read_to_end(&self, path: &VPath) -> Result<Vec<u8>> {
        let mut source = self.source(path).await?;
        let mut buf = Vec::new();
        source.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

/// Object information returned by an [`ObjectStore`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInfo {
    /// Bucket name, object key, or common prefix (ending in `/`)
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    pub is_dir: bool,
}

impl ObjectInfo {
    /// Information for an object
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            last_modified: None,
            etag: None,
            content_type: None,
            is_dir: false,
        }
    }

    /// Information for a common prefix
    pub fn dir(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
            last_modified: None,
            etag: None,
            content_type: None,
            is_dir: true,
        }
    }

    /// Information for a bucket
    pub fn bucket(name: impl Into<String>) -> Self {
        Self::dir(name)
    }

    /// Convert to facade metadata
    pub fn to_metadata(&self) -> FileMetadata {
        if self.is_dir {
            return FileMetadata::directory().with_modified(self.last_modified);
        }
        FileMetadata {
            kind: EntryKind::File,
            size: self.size_bytes.and_then(|s| u64::try_from(s).ok()),
            modified: self.last_modified,
            etag: self.etag.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

/// Object-store client
///
/// Bucket and object CRUD. Implementations are expected to be safe for
/// concurrent use; adapters add no locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all buckets
    async fn list_buckets(&self) -> Result<Vec<ObjectInfo>>;

    /// List objects in a bucket under `prefix`
    ///
    /// Non-recursive listings group deeper keys into common prefixes.
    async fn list_objects(&self, bucket: &str, prefix: &str, recursive: bool)
    -> Result<Vec<ObjectInfo>>;

    /// Object metadata
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo>;

    /// Whether a bucket exists
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Full object body
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Store an object
    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<ObjectInfo>;

    /// Server-side copy
    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()>;

    /// Remove an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Remove a bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<()>;
}
