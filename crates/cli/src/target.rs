//! Target parsing and filesystem construction
//!
//! A target is written `<fs>:<path>`. `<fs>` is one of the built-in
//! filesystems (`res`, `cp`, `local`) or the name of a configured alias.

use std::fmt;
use std::sync::Arc;

use mfs_core::{
    ArchiveAwareFs, Config, Error, FileSystem, LocalFs, ObjectStoreFs, ResourceFs,
    ResourceLoader, Result, VPath,
};
use mfs_s3::S3Client;

/// Names that cannot be used as aliases
pub const RESERVED_NAMES: &[&str] = &["res", "cp", "local"];

/// Which filesystem a target addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsKind {
    /// Plain resource lookup over the configured search path
    Resource,
    /// Archive-aware resource lookup
    Classpath,
    /// Host filesystem rooted at `/`
    Local,
    /// S3-compatible endpoint from the alias table
    Alias(String),
}

impl fmt::Display for FsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsKind::Resource => write!(f, "res"),
            FsKind::Classpath => write!(f, "cp"),
            FsKind::Local => write!(f, "local"),
            FsKind::Alias(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub fs: FsKind,
    pub path: VPath,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fs, self.path)
    }
}

/// Parse `<fs>:<path>`; an empty path means the root
pub fn parse_target(input: &str) -> std::result::Result<Target, String> {
    let Some((fs, path)) = input.split_once(':') else {
        return Err(format!("Invalid target '{input}': expected <fs>:<path>"));
    };
    if fs.is_empty() {
        return Err(format!("Invalid target '{input}': filesystem name is empty"));
    }

    let fs = match fs {
        "res" => FsKind::Resource,
        "cp" => FsKind::Classpath,
        "local" => FsKind::Local,
        name => FsKind::Alias(name.to_string()),
    };

    Ok(Target {
        fs,
        path: VPath::parse(path),
    })
}

/// Build the filesystem a target addresses
///
/// Resource filesystems are rebuilt from the configuration on every call;
/// aliases get a fresh S3 client.
pub async fn open(fs: &FsKind, config: &Config) -> Result<Arc<dyn FileSystem>> {
    tracing::debug!(fs = %fs, "opening filesystem");

    let opened: Arc<dyn FileSystem> = match fs {
        FsKind::Local => Arc::new(LocalFs::host()),
        FsKind::Resource => Arc::new(ResourceFs::new(loader(config), config.resources.scope())),
        FsKind::Classpath => Arc::new(
            ArchiveAwareFs::new(loader(config), config.resources.scope())
                .with_excluded_suffixes(config.resources.exclude_suffixes.iter().cloned()),
        ),
        FsKind::Alias(name) => {
            let alias = config
                .aliases
                .iter()
                .find(|a| &a.name == name)
                .cloned()
                .ok_or_else(|| Error::AliasNotFound(name.clone()))?;
            let client = S3Client::new(alias).await?;
            Arc::new(ObjectStoreFs::new(Arc::new(client)))
        }
    };

    Ok(opened)
}

fn loader(config: &Config) -> Arc<dyn ResourceLoader> {
    Arc::new(config.resources.classpath())
}
