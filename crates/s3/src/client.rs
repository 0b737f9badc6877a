//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from mfs-core.

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use bytes::Bytes;
use jiff::Timestamp;
use mfs_core::{Alias, Error, ObjectInfo, ObjectStore, Result};

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    alias: Alias,
}

impl S3Client {
    /// Create a new S3 client from an alias configuration
    pub async fn new(alias: Alias) -> Result<Self> {
        alias.validate()?;

        let credentials = aws_credential_types::Credentials::new(
            alias.access_key.clone(),
            alias.secret_key.clone(),
            None, // session token
            None, // expiry
            "mfs-static-credentials",
        );

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(alias.region.clone()))
            .endpoint_url(&alias.endpoint)
            .load()
            .await;

        // Path-style addressing for compatibility with self-hosted stores
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(alias.bucket_lookup == "path" || alias.bucket_lookup == "auto")
            .build();

        tracing::debug!(alias = %alias.name, endpoint = %alias.endpoint, "created S3 client");

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            alias,
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    /// Format AWS SDK error into a detailed error message
    fn format_sdk_error<E: std::fmt::Display>(error: &SdkError<E>) -> String {
        match error {
            SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                let meta = service_err.raw();
                let mut msg = format!("Service error: {}", err);
                if let Some(code) = meta.headers().get("x-amz-error-code") {
                    msg.push_str(&format!(" (code: {})", code));
                }
                msg
            }
            SdkError::ConstructionFailure(err) => {
                format!("Request construction failed: {:?}", err)
            }
            SdkError::TimeoutError(_) => "Request timeout".to_string(),
            SdkError::DispatchFailure(err) => {
                format!("Network dispatch error: {:?}", err)
            }
            SdkError::ResponseError(err) => {
                format!("Response error: {:?}", err)
            }
            _ => error.to_string(),
        }
    }

    /// Map an SDK error, turning missing buckets/keys into `NotFound(what)`
    fn map_sdk_error<E: std::fmt::Display>(
        error: &SdkError<E>,
        what: impl FnOnce() -> String,
    ) -> Error {
        let msg = Self::format_sdk_error(error);
        if is_not_found_message(&msg) {
            Error::NotFound(what())
        } else {
            Error::Network(msg)
        }
    }
}

fn is_not_found_message(msg: &str) -> bool {
    msg.contains("NotFound") || msg.contains("NoSuchKey") || msg.contains("NoSuchBucket")
}

fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<Timestamp> {
    Timestamp::from_second(dt.secs()).ok()
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_buckets(&self) -> Result<Vec<ObjectInfo>> {
        let response = self
            .inner
            .list_buckets()
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| {
                let mut info = ObjectInfo::bucket(b.name().unwrap_or_default());
                info.last_modified = b.creation_date().and_then(to_timestamp);
                info
            })
            .collect();

        Ok(buckets)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        recursive: bool,
    ) -> Result<Vec<ObjectInfo>> {
        let mut items = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.inner.list_objects_v2().bucket(bucket);
            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }
            // Delimited listing groups deeper keys into common prefixes
            if !recursive {
                request = request.delimiter("/");
            }
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Self::map_sdk_error(&e, || format!("Bucket not found: {bucket}")))?;

            for common in response.common_prefixes() {
                if let Some(p) = common.prefix() {
                    items.push(ObjectInfo::dir(p));
                }
            }

            for object in response.contents() {
                let mut info = ObjectInfo::file(
                    object.key().unwrap_or_default(),
                    object.size().unwrap_or(0),
                );
                info.last_modified = object.last_modified().and_then(to_timestamp);
                info.etag = object.e_tag().map(|t| t.trim_matches('"').to_string());
                items.push(info);
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(items)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo> {
        let response = self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(&e, || format!("{bucket}/{key}")))?;

        let mut info = ObjectInfo::file(key, response.content_length().unwrap_or(0));
        info.last_modified = response.last_modified().and_then(to_timestamp);
        info.etag = response.e_tag().map(|t| t.trim_matches('"').to_string());
        info.content_type = response.content_type().map(str::to_string);

        Ok(info)
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.inner.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let msg = Self::format_sdk_error(&e);
                if is_not_found_message(&msg) {
                    Ok(false)
                } else {
                    Err(Error::Network(msg))
                }
            }
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(&e, || format!("{bucket}/{key}")))?;

        let body: Bytes = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .into_bytes();

        Ok(body.to_vec())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<ObjectInfo> {
        let size = data.len() as i64;
        let content_type = mime_guess::from_path(key).first_or_octet_stream();
        let body = aws_sdk_s3::primitives::ByteStream::from(Bytes::from(data));

        let response = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type.essence_str())
            .body(body)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(&e, || format!("Bucket not found: {bucket}")))?;

        let mut info = ObjectInfo::file(key, size);
        info.etag = response.e_tag().map(|t| t.trim_matches('"').to_string());
        info.content_type = Some(content_type.essence_str().to_string());
        info.last_modified = Some(Timestamp::now());

        Ok(info)
    }

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        let copy_source = format!("{src_bucket}/{src_key}");

        self.inner
            .copy_object()
            .copy_source(&copy_source)
            .bucket(dst_bucket)
            .key(dst_key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(&e, || copy_source.clone()))?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(&e, || format!("{bucket}/{key}")))?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(&e, || format!("Bucket not found: {bucket}")))?;

        Ok(())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;

        Ok(())
    }
}
