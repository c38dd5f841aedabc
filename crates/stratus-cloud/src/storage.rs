//! Object storage abstraction

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Object storage (S3) operations used during provisioning
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lifecycle rules configured on the bucket
    ///
    /// Returns [`CloudError::LifecycleConfigurationNotFound`] when the bucket
    /// has no lifecycle configuration at all.
    ///
    /// [`CloudError::LifecycleConfigurationNotFound`]: crate::CloudError::LifecycleConfigurationNotFound
    async fn lifecycle_rules(&self, bucket: &str) -> Result<Vec<LifecycleRule>>;

    /// Upload an object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        content_type: &str,
    ) -> Result<UploadReceipt>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;
}

/// Content of an object to upload
#[derive(Debug, Clone)]
pub enum ObjectBody {
    /// Stream the content of a local file
    File(PathBuf),
    /// In-memory content
    Bytes(Vec<u8>),
}

/// A single bucket lifecycle rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRule {
    /// Rule identifier
    pub id: Option<String>,

    /// Whether the rule status is `Enabled`
    pub enabled: bool,

    /// Expiration in days, if the rule expires objects
    pub expiration_days: Option<i32>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub bucket: String,
    pub key: String,

    /// HTTPS URL of the uploaded object
    pub location: String,
}
