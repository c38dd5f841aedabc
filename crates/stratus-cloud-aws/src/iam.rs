//! IAM role directory

use crate::error::remote_error;
use async_trait::async_trait;
use aws_sdk_iam::Client;
use aws_sdk_iam::types::Role;
use stratus_cloud::{CloudError, Result, RoleDirectory};

/// IAM-backed [`RoleDirectory`]
pub struct IamRoleDirectory {
    client: Client,
}

impl IamRoleDirectory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleDirectory for IamRoleDirectory {
    async fn role_arn(&self, role_name: &str) -> Result<String> {
        tracing::debug!("Checking IAM RoleName: {}", role_name);

        let output = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| remote_error(role_name, e))?;

        // GetRole declares both the role and its ARN as required; accept
        // either accessor shape.
        let role: Option<&Role> = output.role().into();
        let arn: Option<&str> = role.and_then(|role| role.arn().into());
        arn.map(str::to_string)
            .ok_or_else(|| CloudError::ResourceNotFound(role_name.to_string()))
    }
}
