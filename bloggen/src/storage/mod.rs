//! Persistence of generated posts.
//!
//! Posts are written verbatim under `<prefix>/<YYYYMMDD_HHMMSS>.txt`. [`BlogStore`] is the seam;
//! [`s3::S3BlogStore`] writes to S3 or any S3-compatible service.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod s3;

/// `strftime` pattern of the timestamp part of an object key.
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Key under which a post generated at `at` is stored.
pub fn object_key(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}/{}.txt", at.format(KEY_TIMESTAMP_FORMAT))
}

/// Fully qualified location of a stored post, rendered as `s3://bucket/key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write s3://{bucket}/{key}: {message}")]
    Put { bucket: String, key: String, message: String },
}

/// A bucket posts can be written to.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Name of the bucket writes go to
    fn bucket(&self) -> &str;

    /// Write `content` at `key`, replacing any existing object.
    async fn put(&self, key: &str, content: &str) -> Result<(), StorageError>;
}
