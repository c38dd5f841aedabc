//! AWS provider for Stratus
//!
//! This crate implements the `stratus-cloud` service traits on top of the
//! AWS SDK:
//!
//! - [`S3ObjectStore`]: `GetBucketLifecycleConfiguration`, `PutObject`, `DeleteObject`
//! - [`IamRoleDirectory`]: `GetRole`
//! - [`CloudFormationStacks`]: `DescribeStacks`, `CreateStack`, `UpdateStack`,
//!   `DescribeStackEvents`
//!
//! # Requirements
//!
//! Credentials and region are resolved through the standard AWS provider
//! chain (environment, shared config/credentials files, instance metadata).
//!
//! # Example
//!
//! ```ignore
//! use stratus_cloud_aws::connect;
//!
//! let session = connect(Some("us-west-2".to_string())).await;
//! let arn = session.roles.role_arn("lambda-exec").await?;
//! ```

pub mod cloudformation;
pub mod error;
pub mod iam;
pub mod s3;

pub use cloudformation::CloudFormationStacks;
pub use iam::IamRoleDirectory;
pub use s3::S3ObjectStore;

use std::sync::Arc;
use stratus_cloud::CloudSession;

/// Load the shared AWS configuration and build a [`CloudSession`]
///
/// `region` overrides whatever the provider chain resolves.
pub async fn connect(region: Option<String>) -> CloudSession {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    let config = loader.load().await;

    let region = config.region().map(|r| r.to_string());
    tracing::debug!("AWS session region: {:?}", region);

    let session = CloudSession::new(
        Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&config))),
        Arc::new(IamRoleDirectory::new(aws_sdk_iam::Client::new(&config))),
        Arc::new(CloudFormationStacks::new(aws_sdk_cloudformation::Client::new(
            &config,
        ))),
    );

    match region {
        Some(region) => session.with_region(region),
        None => session,
    }
}
