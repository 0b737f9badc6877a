//! ZIP/JAR archive backend
//!
//! [`ArchiveFs`] serves a single container file. Entries are enumerated with
//! the `zip` crate; directories are implied by entry names, so an archive
//! without explicit directory entries still lists correctly.
//!
//! Nothing is cached: every call reopens the container on the blocking pool.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::Timestamp;

use crate::error::{Error, Result};
use crate::path::VPath;
use crate::traits::{FileMetadata, FileSystem, Source, memory_source};

/// One entry of the archive's central directory
#[derive(Debug, Clone)]
struct EntryInfo {
    path: VPath,
    is_dir: bool,
    size: u64,
    modified: Option<Timestamp>,
}

/// Read-only backend over a ZIP/JAR container
#[derive(Debug, Clone)]
pub struct ArchiveFs {
    container: PathBuf,
}

impl ArchiveFs {
    /// Open a backend for `container`
    ///
    /// The file is not touched until the first operation.
    pub fn new(container: impl Into<PathBuf>) -> Self {
        Self {
            container: container.into(),
        }
    }

    pub fn container(&self) -> &Path {
        &self.container
    }

    async fn entries(&self) -> Result<Vec<EntryInfo>> {
        let container = self.container.clone();
        blocking(move || read_entries(&container)).await
    }

    fn read_only(&self, op: &str) -> Error {
        Error::ReadOnly(format!("{op} on archive {}", self.container.display()))
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::General(format!("archive task failed: {e}")))?
}

fn open_archive(container: &Path) -> Result<zip::ZipArchive<std::fs::File>> {
    let file = std::fs::File::open(container).map_err(|e| Error::from_io(e, container.display()))?;
    Ok(zip::ZipArchive::new(file)?)
}

fn read_entries(container: &Path) -> Result<Vec<EntryInfo>> {
    let mut archive = open_archive(container)?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        entries.push(EntryInfo {
            path: VPath::parse(entry.name()),
            is_dir: entry.is_dir(),
            size: entry.size(),
            modified: zip_timestamp(entry.last_modified()),
        });
    }
    Ok(entries)
}

fn zip_timestamp(dt: zip::DateTime) -> Option<Timestamp> {
    jiff::civil::DateTime::new(
        dt.year() as i16,
        dt.month() as i8,
        dt.day() as i8,
        dt.hour() as i8,
        dt.minute() as i8,
        dt.second() as i8,
        0,
    )
    .ok()?
    .to_zoned(jiff::tz::TimeZone::UTC)
    .ok()
    .map(|z| z.timestamp())
}

/// Names directly under `dir`, including implied directories
fn child_names(entries: &[EntryInfo], dir: &VPath) -> BTreeSet<String> {
    entries
        .iter()
        .filter_map(|e| e.path.strip_prefix(dir))
        .filter_map(|rest| rest.split('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup(entries: &[EntryInfo], path: &VPath) -> Option<FileMetadata> {
    if path.is_root() {
        return Some(FileMetadata::directory());
    }
    if let Some(entry) = entries.iter().find(|e| &e.path == path) {
        let meta = if entry.is_dir {
            FileMetadata::directory()
        } else {
            FileMetadata::file(entry.size)
        };
        return Some(meta.with_modified(entry.modified));
    }
    entries
        .iter()
        .any(|e| e.path.starts_with(path))
        .then(FileMetadata::directory)
}

#[async_trait]
impl FileSystem for ArchiveFs {
    async fn canonicalize(&self, path: &VPath) -> Result<VPath> {
        let entries = self.entries().await?;
        match lookup(&entries, path) {
            Some(_) => Ok(path.clone()),
            None => Err(Error::NotFound(path.to_string())),
        }
    }

    async fn list(&self, dir: &VPath) -> Result<Vec<VPath>> {
        let entries = self.entries().await?;
        tracing::debug!(
            container = %self.container.display(),
            dir = %dir,
            entries = entries.len(),
            "listing archive directory"
        );
        match lookup(&entries, dir) {
            None => return Err(Error::NotFound(dir.to_string())),
            Some(meta) if meta.is_file() => {
                return Err(Error::InvalidPath(format!("{dir} is not a directory")));
            }
            Some(_) => {}
        }
        Ok(child_names(&entries, dir)
            .iter()
            .map(|name| dir.join(name))
            .collect())
    }

    async fn metadata_or_none(&self, path: &VPath) -> Result<Option<FileMetadata>> {
        let entries = self.entries().await?;
        Ok(lookup(&entries, path))
    }

    async fn source(&self, path: &VPath) -> Result<Source> {
        let container = self.container.clone();
        let name = path.relative().to_string();
        let data = blocking(move || {
            let mut archive = open_archive(&container)?;
            let mut entry = archive.by_name(&name).map_err(|e| match e {
                zip::result::ZipError::FileNotFound => Error::NotFound(format!("/{name}")),
                other => other.into(),
            })?;
            let mut buf = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry.read_to_end(&mut buf)?;
            Ok(buf)
        })
        .await?;
        Ok(memory_source(data))
    }

    async fn sink(&self, _path: &VPath, _data: Vec<u8>) -> Result<()> {
        Err(self.read_only("sink"))
    }

    async fn appending_sink(&self, _path: &VPath, _data: Vec<u8>) -> Result<()> {
        Err(self.read_only("appending_sink"))
    }

    async fn atomic_move(&self, _source: &VPath, _target: &VPath) -> Result<()> {
        Err(self.read_only("atomic_move"))
    }

    async fn delete(&self, _path: &VPath) -> Result<()> {
        Err(self.read_only("delete"))
    }

    async fn create_directory(&self, _dir: &VPath) -> Result<()> {
        Err(self.read_only("create_directory"))
    }
}
