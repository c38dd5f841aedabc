//! S3 object store

use crate::error::remote_error;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ExpirationStatus;
use stratus_cloud::{CloudError, LifecycleRule, ObjectBody, ObjectStore, Result, UploadReceipt};

/// S3-backed [`ObjectStore`]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Virtual-hosted style URL of an object
    fn object_url(&self, bucket: &str, key: &str) -> String {
        object_url(self.client.config().region().map(|r| r.as_ref()), bucket, key)
    }
}

fn object_url(region: Option<&str>, bucket: &str, key: &str) -> String {
    match region {
        Some(region) if region != "us-east-1" => {
            format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
        }
        _ => format!("https://{}.s3.amazonaws.com/{}", bucket, key),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn lifecycle_rules(&self, bucket: &str) -> Result<Vec<LifecycleRule>> {
        let output = self
            .client
            .get_bucket_lifecycle_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| remote_error(bucket, e))?;

        let rules = output
            .rules()
            .iter()
            .map(|rule| {
                let status: Option<&ExpirationStatus> = rule.status().into();
                LifecycleRule {
                    id: rule.id().map(str::to_string),
                    enabled: status == Some(&ExpirationStatus::Enabled),
                    expiration_days: rule.expiration().and_then(|e| e.days()),
                }
            })
            .collect();

        Ok(rules)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        content_type: &str,
    ) -> Result<UploadReceipt> {
        let stream = match body {
            ObjectBody::File(path) => ByteStream::from_path(&path)
                .await
                .map_err(|e| CloudError::Io(std::io::Error::other(e)))?,
            ObjectBody::Bytes(bytes) => ByteStream::from(bytes),
        };

        tracing::debug!("PutObject s3://{}/{}", bucket, key);
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(stream)
            .send()
            .await
            .map_err(|e| remote_error(key, e))?;

        Ok(UploadReceipt {
            bucket: bucket.to_string(),
            key: key.to_string(),
            location: self.object_url(bucket, key),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        tracing::debug!("DeleteObject s3://{}/{}", bucket, key);
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| remote_error(key, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_regional() {
        assert_eq!(
            object_url(Some("eu-west-1"), "artifacts", "demo.zip"),
            "https://artifacts.s3.eu-west-1.amazonaws.com/demo.zip"
        );
    }

    #[test]
    fn test_object_url_global() {
        assert_eq!(
            object_url(Some("us-east-1"), "artifacts", "demo.zip"),
            "https://artifacts.s3.amazonaws.com/demo.zip"
        );
        assert_eq!(
            object_url(None, "artifacts", "demo.zip"),
            "https://artifacts.s3.amazonaws.com/demo.zip"
        );
    }

    #[tokio::test]
    #[ignore] // AWS認証情報が必要なため、通常のテストではスキップ
    async fn test_lifecycle_rules_live() {
        let session = crate::connect(None).await;
        let bucket = std::env::var("STRATUS_TEST_BUCKET").unwrap();
        let result = session.object_store.lifecycle_rules(&bucket).await;
        assert!(result.is_ok() || matches!(result, Err(CloudError::LifecycleConfigurationNotFound(_))));
    }
}
