//! mfs-core: Core library for the mfs filesystem facade
//!
//! This crate provides:
//! - The [`VPath`] path model and object-store addressing
//! - The [`FileSystem`] facade trait
//! - Backends for the host filesystem and ZIP/JAR archives
//! - Resource adapters over a [`ResourceLoader`] search path
//! - An object-store adapter over the SDK-independent [`ObjectStore`] trait
//! - Configuration and alias management
//!
//! The crate does not depend on any S3 SDK; `mfs-s3` supplies the client.

pub mod alias;
pub mod archive;
pub mod config;
pub mod error;
pub mod local;
pub mod object_fs;
pub mod path;
pub mod resource;
pub mod resource_fs;
pub mod traits;

pub use alias::{Alias, AliasManager};
pub use archive::ArchiveFs;
pub use config::{Config, ConfigManager, ResourceConfig};
pub use error::{Error, Result};
pub use local::LocalFs;
pub use object_fs::ObjectStoreFs;
pub use path::{ObjectAddress, VPath};
pub use resource::{Classpath, ClasspathEntry, ResourceLoader};
pub use resource_fs::{ArchiveAwareFs, Binding, Location, ResourceFs, Scope, parse_jar_url};
pub use traits::{EntryKind, FileMetadata, FileSystem, ObjectInfo, ObjectStore, Source};
