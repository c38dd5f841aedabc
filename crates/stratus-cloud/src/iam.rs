//! IAM role lookup

use crate::error::Result;
use async_trait::async_trait;

/// Lookup of pre-existing IAM roles
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Returns the ARN of the named role
    ///
    /// Any failure, including a missing role, is reported as an error.
    async fn role_arn(&self, role_name: &str) -> Result<String>;
}
