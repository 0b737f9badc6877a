//! Resource loading
//!
//! A [`ResourceLoader`] answers two questions about a resource name (a path
//! without its leading separator): where does it live, and what are its
//! bytes. Locations are URL strings:
//!
//! - `file:<host-path>` for a plain file or directory
//! - `jar:file:<container>!/<entry>` for an entry inside a ZIP/JAR
//!
//! [`Classpath`] is the standard loader: an ordered search path of
//! directories and archives where the first root holding a name wins.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Scheme prefix of plain-file locations
pub const FILE_SCHEME: &str = "file:";

/// Scheme prefix of archive-contained locations
pub const JAR_SCHEME: &str = "jar:file:";

/// Resolves resource names to locations and contents
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Location URL of a resource, `None` when no root provides it
    async fn resource_url(&self, name: &str) -> Option<String>;

    /// Bytes of a resource, `None` when no root provides it
    ///
    /// Works uniformly for plain files and archive entries.
    async fn open_resource(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

/// One root of a [`Classpath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClasspathEntry {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl ClasspathEntry {
    /// Classify a root by extension: `.jar` and `.zip` are archives
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_archive = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jar") || e.eq_ignore_ascii_case("zip"));
        if is_archive {
            Self::Archive(path)
        } else {
            Self::Directory(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(p) | Self::Archive(p) => p,
        }
    }
}

/// Ordered search path of directories and archives
#[derive(Debug, Clone, Default)]
pub struct Classpath {
    entries: Vec<ClasspathEntry>,
}

impl Classpath {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        Self { entries }
    }

    /// Build from root paths, classifying each with [`ClasspathEntry::detect`]
    pub fn from_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(roots.into_iter().map(ClasspathEntry::detect).collect())
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    async fn archive_contains(container: &Path, name: &str) -> Result<bool> {
        let container = container.to_path_buf();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || -> Result<bool> {
            if name.is_empty() {
                return Ok(container.is_file());
            }
            let file = std::fs::File::open(&container)?;
            let archive = zip::ZipArchive::new(file)?;
            let dir_prefix = format!("{name}/");
            let found = archive
                .file_names()
                .any(|n| n == name || n.starts_with(&dir_prefix));
            Ok(found)
        })
        .await
        .map_err(|e| Error::General(format!("classpath task failed: {e}")))?
    }

    async fn read_archive_entry(container: &Path, name: &str) -> Result<Option<Vec<u8>>> {
        let container = container.to_path_buf();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>> {
            let file = std::fs::File::open(&container)?;
            let mut archive = zip::ZipArchive::new(file)?;
            let mut entry = match archive.by_name(&name) {
                Ok(entry) => entry,
                Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            if entry.is_dir() {
                return Ok(None);
            }
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            Ok(Some(buf))
        })
        .await
        .map_err(|e| Error::General(format!("classpath task failed: {e}")))?
    }
}

#[async_trait]
impl ResourceLoader for Classpath {
    async fn resource_url(&self, name: &str) -> Option<String> {
        for entry in &self.entries {
            match entry {
                ClasspathEntry::Directory(root) => {
                    let candidate = if name.is_empty() {
                        root.clone()
                    } else {
                        root.join(name)
                    };
                    if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                        return Some(format!("{FILE_SCHEME}{}", candidate.display()));
                    }
                }
                ClasspathEntry::Archive(container) => {
                    match Self::archive_contains(container, name).await {
                        Ok(true) => {
                            return Some(format!("{JAR_SCHEME}{}!/{name}", container.display()));
                        }
                        Ok(false) => {}
                        Err(e) => tracing::warn!(
                            container = %container.display(),
                            error = %e,
                            "skipping unreadable classpath archive"
                        ),
                    }
                }
            }
        }
        None
    }

    async fn open_resource(&self, name: &str) -> Result<Option<Vec<u8>>> {
        for entry in &self.entries {
            match entry {
                ClasspathEntry::Directory(root) => {
                    let candidate = root.join(name);
                    match tokio::fs::read(&candidate).await {
                        Ok(data) => return Ok(Some(data)),
                        Err(e)
                            if matches!(
                                e.kind(),
                                std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
                            ) => {}
                        Err(e) => return Err(Error::Io(e)),
                    }
                }
                ClasspathEntry::Archive(container) => {
                    match Self::read_archive_entry(container, name).await {
                        Ok(Some(data)) => return Ok(Some(data)),
                        Ok(None) => {}
                        Err(e) => tracing::warn!(
                            container = %container.display(),
                            error = %e,
                            "skipping unreadable classpath archive"
                        ),
                    }
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::write_zip;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Classpath) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("classes");
        std::fs::create_dir_all(dir.join("config")).unwrap();
        std::fs::write(dir.join("config/app.toml"), b"from-dir").unwrap();
        let jar = tmp.path().join("lib.jar");
        write_zip(
            &jar,
            &[
                ("config/app.toml", "from-jar"),
                ("config/extra.toml", "extra"),
            ],
        );
        let cp = Classpath::from_roots([dir, jar]);
        (tmp, cp)
    }

    #[test]
    fn test_detect_entry_kind() {
        assert!(matches!(ClasspathEntry::detect("a/lib.JAR"), ClasspathEntry::Archive(_)));
        assert!(matches!(ClasspathEntry::detect("a/lib.zip"), ClasspathEntry::Archive(_)));
        assert!(matches!(ClasspathEntry::detect("a/classes"), ClasspathEntry::Directory(_)));
    }

    #[tokio::test]
    async fn test_first_root_wins() {
        let (tmp, cp) = setup();
        let url = cp.resource_url("config/app.toml").await.unwrap();
        assert_eq!(
            url,
            format!("file:{}", tmp.path().join("classes/config/app.toml").display())
        );
        let data = cp.open_resource("config/app.toml").await.unwrap().unwrap();
        assert_eq!(data, b"from-dir");
    }

    #[tokio::test]
    async fn test_archive_fallback() {
        let (tmp, cp) = setup();
        let url = cp.resource_url("config/extra.toml").await.unwrap();
        assert_eq!(
            url,
            format!("jar:file:{}!/config/extra.toml", tmp.path().join("lib.jar").display())
        );
        let data = cp.open_resource("config/extra.toml").await.unwrap().unwrap();
        assert_eq!(data, b"extra");
    }

    #[tokio::test]
    async fn test_missing_resource() {
        let (_tmp, cp) = setup();
        assert!(cp.resource_url("nope.txt").await.is_none());
        assert!(cp.open_resource("nope.txt").await.unwrap().is_none());
        // directories are locatable but not readable
        assert!(cp.resource_url("config").await.is_some());
        assert!(cp.open_resource("config").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_broken_archive_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("broken.jar");
        std::fs::write(&jar, b"not a zip").unwrap();
        let cp = Classpath::from_roots([jar]);
        assert!(cp.resource_url("a.txt").await.is_none());
        assert!(cp.open_resource("a.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_broken_archive_does_not_hide_later_roots() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("broken.jar");
        std::fs::write(&jar, b"not a zip").unwrap();
        let classes = tmp.path().join("classes");
        std::fs::create_dir_all(&classes).unwrap();
        std::fs::write(classes.join("a.txt"), b"from-dir").unwrap();

        let cp = Classpath::from_roots([jar, classes.clone()]);
        assert_eq!(
            cp.resource_url("a.txt").await,
            Some(format!("file:{}", classes.join("a.txt").display()))
        );
        assert_eq!(cp.open_resource("a.txt").await.unwrap(), Some(b"from-dir".to_vec()));
    }
}
