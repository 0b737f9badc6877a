//! Object-store filesystem adapter
//!
//! [`ObjectStoreFs`] maps the first path segment to a bucket and the rest to
//! an object key (see [`ObjectAddress::split`]). The root lists buckets.
//!
//! Bodies are loaded fully into memory; there is no streaming and no retry.
//! `atomic_move` is a copy followed by a delete of the source, so it is not
//! atomic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::path::{ObjectAddress, SEPARATOR, VPath};
use crate::traits::{FileMetadata, FileSystem, ObjectStore, Source, memory_source};

/// Filesystem over an object-store client
#[derive(Clone)]
pub struct ObjectStoreFs {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreFs {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    fn object_address(path: &VPath) -> Result<(String, String)> {
        let addr = ObjectAddress::split(path)?;
        let key = addr.require_key()?.to_string();
        Ok((addr.bucket, key))
    }
}

#[async_trait]
impl FileSystem for ObjectStoreFs {
    async fn canonicalize(&self, path: &VPath) -> Result<VPath> {
        Err(Error::Unsupported(format!("canonicalize {path} on object store")))
    }

    async fn list(&self, dir: &VPath) -> Result<Vec<VPath>> {
        if dir.is_root() {
            let buckets = self.store.list_buckets().await?;
            return Ok(buckets
                .iter()
                .map(|b| VPath::root().join(&b.key))
                .collect());
        }

        let addr = ObjectAddress::split(dir)?;
        let prefix = addr
            .key
            .as_ref()
            .map(|k| format!("{k}{SEPARATOR}"))
            .unwrap_or_default();
        tracing::debug!(bucket = %addr.bucket, prefix = %prefix, "listing objects");

        let objects = self.store.list_objects(&addr.bucket, &prefix, false).await?;
        let mut children: Vec<VPath> = objects
            .iter()
            .filter_map(|o| {
                let rest = o.key.strip_prefix(prefix.as_str()).unwrap_or(&o.key);
                let rest = rest.trim_end_matches(SEPARATOR);
                (!rest.is_empty()).then(|| dir.join(rest))
            })
            .collect();
        children.sort();
        children.dedup();
        Ok(children)
    }

    async fn metadata_or_none(&self, path: &VPath) -> Result<Option<FileMetadata>> {
        if path.is_root() {
            return Err(Error::Unsupported("metadata of the object-store root".to_string()));
        }
        let addr = ObjectAddress::split(path)?;
        match &addr.key {
            None => Ok(self
                .store
                .bucket_exists(&addr.bucket)
                .await?
                .then(FileMetadata::directory)),
            Some(key) => match self.store.head_object(&addr.bucket, key).await {
                Ok(info) => Ok(Some(info.to_metadata())),
                Err(Error::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    async fn source(&self, path: &VPath) -> Result<Source> {
        let (bucket, key) = Self::object_address(path)?;
        let data = self.store.get_object(&bucket, &key).await?;
        tracing::debug!(bucket = %bucket, key = %key, size = data.len(), "fetched object");
        Ok(memory_source(data))
    }

    async fn sink(&self, path: &VPath, data: Vec<u8>) -> Result<()> {
        let (bucket, key) = Self::object_address(path)?;
        self.store.put_object(&bucket, &key, data).await?;
        Ok(())
    }

    async fn appending_sink(&self, path: &VPath, _data: Vec<u8>) -> Result<()> {
        Err(Error::Unsupported(format!("append to {path} on object store")))
    }

    async fn atomic_move(&self, source: &VPath, target: &VPath) -> Result<()> {
        let (src_bucket, src_key) = Self::object_address(source)?;
        let (dst_bucket, dst_key) = Self::object_address(target)?;
        // Copy-then-delete onto itself would remove the object
        if src_bucket == dst_bucket && src_key == dst_key {
            return Ok(());
        }
        self.store
            .copy_object(&src_bucket, &src_key, &dst_bucket, &dst_key)
            .await?;
        self.store.delete_object(&src_bucket, &src_key).await
    }

    async fn delete(&self, path: &VPath) -> Result<()> {
        let addr = ObjectAddress::split(path)?;
        match &addr.key {
            Some(key) => self.store.delete_object(&addr.bucket, key).await,
            None => self.store.delete_bucket(&addr.bucket).await,
        }
    }

    async fn create_directory(&self, dir: &VPath) -> Result<()> {
        let addr = ObjectAddress::split(dir)?;
        if let Some(key) = &addr.key {
            tracing::debug!(
                bucket = %addr.bucket,
                key = %key,
                "object key ignored when creating bucket"
            );
        }
        self.store.create_bucket(&addr.bucket).await
    }
}
