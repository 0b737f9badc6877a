//! mfs-s3: S3 SDK adapter for mfs
//!
//! Implements [`mfs_core::ObjectStore`] on top of aws-sdk-s3.

mod client;

pub use client::S3Client;
