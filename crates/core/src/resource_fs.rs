//! Resource-backed filesystem adapters
//!
//! [`ResourceFs`] addresses resources by logical path through a
//! [`ResourceLoader`], with an optional allow-list of path prefixes. Listing
//! and metadata fall back to the host filesystem, so they only work for
//! resources that resolve to plain files.
//!
//! [`ArchiveAwareFs`] additionally understands resources living inside a
//! ZIP/JAR container: every path is resolved to a [`Binding`] that pairs it
//! with the backend able to serve it.
//!
//! Both adapters are read-only.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::archive::ArchiveFs;
use crate::error::{Error, Result};
use crate::local::LocalFs;
use crate::path::VPath;
use crate::resource::{FILE_SCHEME, JAR_SCHEME, ResourceLoader};
use crate::traits::{FileMetadata, FileSystem, Source, memory_source};

/// Entry suffix hidden from archive-aware listings by default
pub const COMPILED_CLASS_SUFFIX: &str = ".class";

/// Where a resource location points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Plain file or directory on the host
    File(PathBuf),
    /// Entry inside a container file
    Archive { container: PathBuf, entry: VPath },
    /// Any other scheme
    Other(String),
}

impl Location {
    /// Classify a location URL
    pub fn parse(url: &str) -> Result<Self> {
        if url.starts_with(JAR_SCHEME) {
            let (container, entry) = parse_jar_url(url)?;
            Ok(Self::Archive { container, entry })
        } else if let Some(path) = url.strip_prefix(FILE_SCHEME) {
            Ok(Self::File(PathBuf::from(path)))
        } else {
            Ok(Self::Other(url.to_string()))
        }
    }
}

/// Split `jar:file:<container>!<entry>` into container path and entry path
///
/// The container is everything between the scheme and the last `!`; the
/// entry is everything after it.
pub fn parse_jar_url(url: &str) -> Result<(PathBuf, VPath)> {
    let rest = url.strip_prefix(JAR_SCHEME).unwrap_or(url);
    let (container, entry) = rest
        .rsplit_once('!')
        .ok_or_else(|| Error::MalformedLocation(format!("missing '!' in {url}")))?;
    Ok((PathBuf::from(container), VPath::parse(entry)))
}

/// Backend able to serve a resolved path
#[derive(Debug, Clone)]
pub enum Binding {
    Local { fs: LocalFs, path: VPath },
    Archive { fs: ArchiveFs, path: VPath },
    Unsupported { location: String },
}

impl Binding {
    fn from_location(location: Location) -> Self {
        match location {
            // Rooted at the host path itself; relative roots stay relative
            Location::File(host) => Binding::Local {
                fs: LocalFs::new(host),
                path: VPath::root(),
            },
            Location::Archive { container, entry } => Binding::Archive {
                fs: ArchiveFs::new(container),
                path: entry,
            },
            Location::Other(location) => Binding::Unsupported { location },
        }
    }

    /// Backend and backend-local path, or `Unsupported` for foreign schemes
    pub fn backend(&self) -> Result<(&dyn FileSystem, &VPath)> {
        match self {
            Binding::Local { fs, path } => Ok((fs as &dyn FileSystem, path)),
            Binding::Archive { fs, path } => Ok((fs as &dyn FileSystem, path)),
            Binding::Unsupported { location } => Err(Error::Unsupported(format!(
                "cannot introspect resource at {location}"
            ))),
        }
    }
}

/// Allow-list of path prefixes
#[derive(Debug, Clone, Default)]
pub struct Scope {
    prefixes: Option<Vec<String>>,
}

impl Scope {
    /// No restriction
    pub fn unrestricted() -> Self {
        Self { prefixes: None }
    }

    /// Restrict to paths whose string form starts with one of `prefixes`
    pub fn allow<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: Some(prefixes.into_iter().map(Into::into).collect()),
        }
    }

    pub fn prefixes(&self) -> Option<&[String]> {
        self.prefixes.as_deref()
    }

    /// Normalize `path` and check it against the allow-list
    pub fn canonicalize(&self, path: &VPath) -> Result<VPath> {
        let canonical = VPath::parse(path.as_str());
        match &self.prefixes {
            Some(prefixes) if !prefixes.iter().any(|p| canonical.starts_with_str(p)) => {
                Err(Error::OutOfScope(canonical.to_string()))
            }
            _ => Ok(canonical),
        }
    }
}

/// Read-only filesystem over a resource loader
#[derive(Clone)]
pub struct ResourceFs {
    loader: Arc<dyn ResourceLoader>,
    scope: Scope,
}

impl ResourceFs {
    pub fn new(loader: Arc<dyn ResourceLoader>, scope: Scope) -> Self {
        Self { loader, scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.loader
    }

    async fn open(&self, path: &VPath) -> Result<Source> {
        let canonical = self.scope.canonicalize(path)?;
        match self.loader.open_resource(canonical.relative()).await? {
            Some(data) => Ok(memory_source(data)),
            None => Err(Error::NotFound(canonical.to_string())),
        }
    }

    async fn system_path(&self, canonical: &VPath) -> Option<PathBuf> {
        let url = self.loader.resource_url(canonical.relative()).await?;
        match Location::parse(&url) {
            Ok(Location::File(host)) => Some(host),
            _ => None,
        }
    }
}

fn read_only(op: &str, path: &VPath) -> Error {
    Error::ReadOnly(format!("{op} {path} on resource filesystem"))
}

#[async_trait]
impl FileSystem for ResourceFs {
    async fn canonicalize(&self, path: &VPath) -> Result<VPath> {
        self.scope.canonicalize(path)
    }

    async fn list(&self, dir: &VPath) -> Result<Vec<VPath>> {
        let canonical = self.scope.canonicalize(dir)?;
        let host = self.system_path(&canonical).await.ok_or_else(|| {
            Error::Io(std::io::Error::other(format!(
                "{canonical} is not a local resource"
            )))
        })?;
        tracing::debug!(dir = %canonical, host = %host.display(), "listing resource directory");
        let names = LocalFs::read_dir_names(&host).await?;
        Ok(names.iter().map(|n| canonical.join(n)).collect())
    }

    async fn metadata_or_none(&self, path: &VPath) -> Result<Option<FileMetadata>> {
        let canonical = self.scope.canonicalize(path)?;
        match self.system_path(&canonical).await {
            Some(host) => LocalFs::stat_host(&host).await,
            None => Ok(None),
        }
    }

    async fn source(&self, path: &VPath) -> Result<Source> {
        self.open(path).await
    }

    async fn sink(&self, path: &VPath, _data: Vec<u8>) -> Result<()> {
        Err(read_only("sink", path))
    }

    async fn appending_sink(&self, path: &VPath, _data: Vec<u8>) -> Result<()> {
        Err(read_only("appending_sink", path))
    }

    async fn atomic_move(&self, source: &VPath, _target: &VPath) -> Result<()> {
        Err(read_only("atomic_move", source))
    }

    async fn delete(&self, path: &VPath) -> Result<()> {
        Err(read_only("delete", path))
    }

    async fn create_directory(&self, dir: &VPath) -> Result<()> {
        Err(read_only("create_directory", dir))
    }

    async fn to_system_path(&self, path: &VPath) -> Result<Option<PathBuf>> {
        let canonical = self.scope.canonicalize(path)?;
        Ok(self.system_path(&canonical).await)
    }
}

/// Resource filesystem that looks inside ZIP/JAR containers
#[derive(Clone)]
pub struct ArchiveAwareFs {
    inner: ResourceFs,
    excluded_suffixes: Vec<String>,
}

impl ArchiveAwareFs {
    pub fn new(loader: Arc<dyn ResourceLoader>, scope: Scope) -> Self {
        Self {
            inner: ResourceFs::new(loader, scope),
            excluded_suffixes: vec![COMPILED_CLASS_SUFFIX.to_string()],
        }
    }

    /// Replace the entry suffixes hidden from listings
    pub fn with_excluded_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn scope(&self) -> &Scope {
        self.inner.scope()
    }

    /// Resolve a path to the backend that can serve it
    ///
    /// `None` when the loader does not know the resource. Bindings are built
    /// per call; archives are reopened every time.
    pub async fn resolve_backend(&self, path: &VPath) -> Result<Option<Binding>> {
        let canonical = self.inner.scope.canonicalize(path)?;
        let Some(url) = self.inner.loader.resource_url(canonical.relative()).await else {
            return Ok(None);
        };
        let binding = Binding::from_location(Location::parse(&url)?);
        tracing::debug!(path = %canonical, url = %url, ?binding, "resolved resource backend");
        Ok(Some(binding))
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

#[async_trait]
impl FileSystem for ArchiveAwareFs {
    async fn canonicalize(&self, path: &VPath) -> Result<VPath> {
        self.inner.scope.canonicalize(path)
    }

    async fn list(&self, dir: &VPath) -> Result<Vec<VPath>> {
        let canonical = self.inner.scope.canonicalize(dir)?;
        let binding = self
            .resolve_backend(&canonical)
            .await?
            .ok_or_else(|| Error::NotFound(canonical.to_string()))?;
        let (fs, local) = binding.backend()?;
        let children = fs.list(local).await?;
        Ok(children
            .iter()
            .filter_map(|child| child.name())
            .filter(|name| !self.is_excluded(name))
            .map(|name| canonical.join(name))
            .collect())
    }

    async fn metadata_or_none(&self, path: &VPath) -> Result<Option<FileMetadata>> {
        let Some(binding) = self.resolve_backend(path).await? else {
            return Ok(None);
        };
        let (fs, local) = binding.backend()?;
        fs.metadata_or_none(local).await
    }

    async fn source(&self, path: &VPath) -> Result<Source> {
        self.inner.open(path).await
    }

    async fn sink(&self, path: &VPath, data: Vec<u8>) -> Result<()> {
        self.inner.sink(path, data).await
    }

    async fn appending_sink(&self, path: &VPath, data: Vec<u8>) -> Result<()> {
        self.inner.appending_sink(path, data).await
    }

    async fn atomic_move(&self, source: &VPath, target: &VPath) -> Result<()> {
        self.inner.atomic_move(source, target).await
    }

    async fn delete(&self, path: &VPath) -> Result<()> {
        self.inner.delete(path).await
    }

    async fn create_directory(&self, dir: &VPath) -> Result<()> {
        self.inner.create_directory(dir).await
    }

    async fn to_system_path(&self, path: &VPath) -> Result<Option<PathBuf>> {
        self.inner.to_system_path(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::write_zip;
    use crate::resource::Classpath;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        classes: PathBuf,
        loader: Arc<dyn ResourceLoader>,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let classes = tmp.path().join("classes");
        std::fs::create_dir_all(classes.join("static/css")).unwrap();
        std::fs::write(classes.join("static/index.html"), b"<html/>").unwrap();
        std::fs::write(classes.join("static/css/site.css"), b"body{}").unwrap();
        std::fs::create_dir_all(classes.join("private")).unwrap();
        std::fs::write(classes.join("private/key.pem"), b"secret").unwrap();

        let jar = tmp.path().join("lib.jar");
        write_zip(
            &jar,
            &[
                ("org/lib/Util.class", "cafebabe"),
                ("org/lib/Util$Inner.class", "cafebabe"),
                ("org/lib/messages.properties", "hello=world"),
                ("org/lib/i18n/fr.properties", "hello=monde"),
                ("org/lib/i18n/deep/x.txt", "x"),
            ],
        );
        let loader: Arc<dyn ResourceLoader> =
            Arc::new(Classpath::from_roots([classes.clone(), jar]));
        Fixture {
            _tmp: tmp,
            classes,
            loader,
        }
    }

    struct FixedLoader(&'static str);

    #[async_trait]
    impl ResourceLoader for FixedLoader {
        async fn resource_url(&self, _name: &str) -> Option<String> {
            Some(self.0.to_string())
        }

        async fn open_resource(&self, _name: &str) -> Result<Option<Vec<u8>>> {
            Ok(Some(b"remote".to_vec()))
        }
    }

    #[test]
    fn test_parse_jar_url() {
        let (container, entry) =
            parse_jar_url("jar:file:/opt/app/lib.jar!/org/lib/messages.properties").unwrap();
        assert_eq!(container, PathBuf::from("/opt/app/lib.jar"));
        assert_eq!(entry, VPath::parse("/org/lib/messages.properties"));

        // container is everything up to the last '!'
        let (container, entry) = parse_jar_url("jar:file:/a!b.jar!/x").unwrap();
        assert_eq!(container, PathBuf::from("/a!b.jar"));
        assert_eq!(entry, VPath::parse("/x"));

        assert!(matches!(
            parse_jar_url("jar:file:/opt/app/lib.jar"),
            Err(Error::MalformedLocation(_))
        ));
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(
            Location::parse("file:/srv/res/a.txt").unwrap(),
            Location::File(PathBuf::from("/srv/res/a.txt"))
        );
        assert!(matches!(
            Location::parse("jar:file:/l.jar!/a").unwrap(),
            Location::Archive { .. }
        ));
        assert_eq!(
            Location::parse("http://example.com/a").unwrap(),
            Location::Other("http://example.com/a".to_string())
        );
    }

    #[test]
    fn test_scope() {
        let scope = Scope::allow(["/static", "/templates"]);
        assert_eq!(
            scope.canonicalize(&VPath::parse("static//css/../index.html")).unwrap(),
            VPath::parse("/static/index.html")
        );
        assert!(matches!(
            scope.canonicalize(&VPath::parse("/private/key.pem")),
            Err(Error::OutOfScope(_))
        ));
        // normalization happens before the check
        assert!(matches!(
            scope.canonicalize(&VPath::parse("/static/../private/key.pem")),
            Err(Error::OutOfScope(_))
        ));
        assert!(Scope::unrestricted().canonicalize(&VPath::parse("/any")).is_ok());
    }

    #[tokio::test]
    async fn test_allow_list_enforced_on_every_operation() {
        let fx = fixture();
        let fs = ResourceFs::new(fx.loader.clone(), Scope::allow(["/static"]));
        let secret = VPath::parse("/private/key.pem");

        assert!(matches!(fs.canonicalize(&secret).await, Err(Error::OutOfScope(_))));
        assert!(matches!(fs.source(&secret).await, Err(Error::OutOfScope(_))));
        assert!(matches!(fs.metadata_or_none(&secret).await, Err(Error::OutOfScope(_))));
        assert!(matches!(
            fs.list(&VPath::parse("/private")).await,
            Err(Error::OutOfScope(_))
        ));
        assert_eq!(
            fs.read_to_end(&VPath::parse("/static/index.html")).await.unwrap(),
            b"<html/>"
        );
    }

    #[tokio::test]
    async fn test_resource_list_matches_local() {
        let fx = fixture();
        let fs = ResourceFs::new(fx.loader.clone(), Scope::unrestricted());
        let local = LocalFs::new(&fx.classes);
        let dir = VPath::parse("/static");

        let listed = fs.list(&dir).await.unwrap();
        assert_eq!(listed, local.list(&dir).await.unwrap());
        assert_eq!(
            listed,
            vec![VPath::parse("/static/css"), VPath::parse("/static/index.html")]
        );

        let path = VPath::parse("/static/css/site.css");
        assert_eq!(
            fs.metadata_or_none(&path).await.unwrap(),
            local.metadata_or_none(&path).await.unwrap()
        );
        assert_eq!(
            fs.to_system_path(&path).await.unwrap(),
            Some(fx.classes.join("static/css/site.css"))
        );
    }

    #[tokio::test]
    async fn test_resource_fs_cannot_list_archives() {
        let fx = fixture();
        let fs = ResourceFs::new(fx.loader.clone(), Scope::unrestricted());
        let dir = VPath::parse("/org/lib");

        assert!(matches!(fs.list(&dir).await, Err(Error::Io(_))));
        assert!(fs.metadata_or_none(&dir).await.unwrap().is_none());
        assert!(fs.to_system_path(&dir).await.unwrap().is_none());
        // reading works regardless of the container
        assert_eq!(
            fs.read_to_end(&VPath::parse("/org/lib/messages.properties"))
                .await
                .unwrap(),
            b"hello=world"
        );
    }

    #[tokio::test]
    async fn test_resource_fs_missing() {
        let fx = fixture();
        let fs = ResourceFs::new(fx.loader.clone(), Scope::unrestricted());
        let err = fs.source(&VPath::parse("/nope")).await.err().unwrap();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(matches!(
            fs.sink(&VPath::parse("/x"), vec![]).await,
            Err(Error::ReadOnly(_))
        ));
    }

    #[tokio::test]
    async fn test_archive_listing_filters_classes_and_depth() {
        let fx = fixture();
        let fs = ArchiveAwareFs::new(fx.loader.clone(), Scope::unrestricted());
        let listed = fs.list(&VPath::parse("/org/lib")).await.unwrap();
        assert_eq!(
            listed,
            vec![
                VPath::parse("/org/lib/i18n"),
                VPath::parse("/org/lib/messages.properties"),
            ]
        );
    }

    #[tokio::test]
    async fn test_archive_aware_local_listing() {
        let fx = fixture();
        let fs = ArchiveAwareFs::new(fx.loader.clone(), Scope::unrestricted());
        std::fs::write(fx.classes.join("static/Gen.class"), b"x").unwrap();
        let listed = fs.list(&VPath::parse("/static")).await.unwrap();
        assert_eq!(
            listed,
            vec![VPath::parse("/static/css"), VPath::parse("/static/index.html")]
        );

        let custom = fs.clone().with_excluded_suffixes(Vec::<String>::new());
        assert_eq!(custom.list(&VPath::parse("/static")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_relative_root_agrees_with_local_fs() {
        // cargo runs tests from the package directory, so `src` resolves
        let loader: Arc<dyn ResourceLoader> = Arc::new(Classpath::from_roots(["src"]));
        let plain = ResourceFs::new(loader.clone(), Scope::unrestricted());
        let aware = ArchiveAwareFs::new(loader, Scope::unrestricted());
        let local = LocalFs::new("src");

        let expected = local.list(&VPath::root()).await.unwrap();
        assert!(expected.contains(&VPath::parse("/lib.rs")));
        assert_eq!(plain.list(&VPath::root()).await.unwrap(), expected);
        assert_eq!(aware.list(&VPath::root()).await.unwrap(), expected);

        let file = VPath::parse("/lib.rs");
        let expected = local.metadata_or_none(&file).await.unwrap();
        assert!(expected.as_ref().is_some_and(FileMetadata::is_file));
        assert_eq!(plain.metadata_or_none(&file).await.unwrap(), expected);
        assert_eq!(aware.metadata_or_none(&file).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_resolve_backend() {
        let fx = fixture();
        let fs = ArchiveAwareFs::new(fx.loader.clone(), Scope::unrestricted());

        match fs.resolve_backend(&VPath::parse("/static/index.html")).await.unwrap() {
            Some(Binding::Local { fs, path }) => {
                assert_eq!(fs.root(), fx.classes.join("static/index.html"));
                assert!(path.is_root());
            }
            other => panic!("expected local binding, got {other:?}"),
        }

        match fs.resolve_backend(&VPath::parse("/org/lib/i18n")).await.unwrap() {
            Some(Binding::Archive { fs, path }) => {
                assert!(fs.container().ends_with("lib.jar"));
                assert_eq!(path, VPath::parse("/org/lib/i18n"));
            }
            other => panic!("expected archive binding, got {other:?}"),
        }

        assert!(fs.resolve_backend(&VPath::parse("/nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_archive_metadata_and_source() {
        let fx = fixture();
        let fs = ArchiveAwareFs::new(fx.loader.clone(), Scope::unrestricted());

        let meta = fs
            .metadata_or_none(&VPath::parse("/org/lib/messages.properties"))
            .await
            .unwrap()
            .unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.size, Some(11));

        let dir = fs.metadata_or_none(&VPath::parse("/org/lib")).await.unwrap().unwrap();
        assert!(dir.is_dir());

        assert!(fs.metadata_or_none(&VPath::parse("/missing")).await.unwrap().is_none());

        let data = fs
            .read_to_end(&VPath::parse("/org/lib/i18n/fr.properties"))
            .await
            .unwrap();
        assert_eq!(data, b"hello=monde");
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_an_error() {
        let loader: Arc<dyn ResourceLoader> = Arc::new(FixedLoader("http://cdn.example.com/a"));
        let fs = ArchiveAwareFs::new(loader, Scope::unrestricted());
        let p = VPath::parse("/a");

        assert!(matches!(fs.list(&p).await, Err(Error::Unsupported(_))));
        assert!(matches!(fs.metadata_or_none(&p).await, Err(Error::Unsupported(_))));
        // reads go straight to the loader
        assert_eq!(fs.read_to_end(&p).await.unwrap(), b"remote");
    }

    #[tokio::test]
    async fn test_malformed_jar_location() {
        let loader: Arc<dyn ResourceLoader> = Arc::new(FixedLoader("jar:file:/opt/lib.jar"));
        let fs = ArchiveAwareFs::new(loader, Scope::unrestricted());
        assert!(matches!(
            fs.list(&VPath::parse("/a")).await,
            Err(Error::MalformedLocation(_))
        ));
    }

    #[tokio::test]
    async fn test_archive_aware_missing_dir() {
        let fx = fixture();
        let fs = ArchiveAwareFs::new(fx.loader.clone(), Scope::allow(["/org"]));
        assert!(matches!(
            fs.list(&VPath::parse("/org/none")).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            fs.list(&VPath::parse("/static")).await,
            Err(Error::OutOfScope(_))
        ));
    }
}
