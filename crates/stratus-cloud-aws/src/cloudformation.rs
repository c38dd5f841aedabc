//! CloudFormation stack service

use crate::error::{remote_error, to_chrono};
use async_trait::async_trait;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::primitives::DateTime;
use aws_sdk_cloudformation::types::{Capability, OnFailure as AwsOnFailure, Stack, StackStatus};
use stratus_cloud::{
    CloudError, CreateStackRequest, Result, StackDescription, StackEvent, StackEventPage,
    StackOutput, StackService, UpdateStackRequest,
};

/// CloudFormation-backed [`StackService`]
pub struct CloudFormationStacks {
    client: Client,
}

impl CloudFormationStacks {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn capabilities(names: &[String]) -> Option<Vec<Capability>> {
    if names.is_empty() {
        None
    } else {
        Some(names.iter().map(|c| Capability::from(c.as_str())).collect())
    }
}

// Some members are required in the service model; `Into<Option<_>>`
// accepts both the plain and the optional accessor shape.
fn describe(stack: &Stack) -> StackDescription {
    let stack_name: Option<&str> = stack.stack_name().into();
    let status: Option<&StackStatus> = stack.stack_status().into();
    let created: Option<&DateTime> = stack.creation_time().into();
    let stack_id: Option<&str> = stack.stack_id().into();

    StackDescription {
        stack_id: stack_id.unwrap_or_default().to_string(),
        stack_name: stack_name.unwrap_or_default().to_string(),
        status: status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        status_reason: stack.stack_status_reason().map(str::to_string),
        outputs: stack
            .outputs()
            .iter()
            .map(|o| StackOutput {
                key: o.output_key().unwrap_or_default().to_string(),
                value: o.output_value().unwrap_or_default().to_string(),
                description: o.description().map(str::to_string),
            })
            .collect(),
        creation_time: created.and_then(to_chrono),
    }
}

#[async_trait]
impl StackService for CloudFormationStacks {
    async fn describe_stack(&self, stack_name_or_id: &str) -> Result<StackDescription> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name_or_id)
            .send()
            .await
            .map_err(|e| remote_error(stack_name_or_id, e))?;

        tracing::debug!("DescribeStacks output: {:?}", output);

        output
            .stacks()
            .first()
            .map(describe)
            .ok_or_else(|| {
                CloudError::ApiError(format!("Failed to enumerate stack info: {}", stack_name_or_id))
            })
    }

    async fn create_stack(&self, request: &CreateStackRequest) -> Result<String> {
        let output = self
            .client
            .create_stack()
            .stack_name(&request.stack_name)
            .template_url(&request.template_url)
            .timeout_in_minutes(request.timeout_minutes)
            .on_failure(AwsOnFailure::from(request.on_failure.as_str()))
            .set_capabilities(capabilities(&request.capabilities))
            .send()
            .await
            .map_err(|e| remote_error(&request.stack_name, e))?;

        output
            .stack_id()
            .map(str::to_string)
            .ok_or_else(|| CloudError::ApiError("CreateStack returned no stack id".to_string()))
    }

    async fn update_stack(&self, request: &UpdateStackRequest) -> Result<String> {
        let output = self
            .client
            .update_stack()
            .stack_name(&request.stack_name)
            .template_url(&request.template_url)
            .set_capabilities(capabilities(&request.capabilities))
            .send()
            .await
            .map_err(|e| remote_error(&request.stack_name, e))?;

        output
            .stack_id()
            .map(str::to_string)
            .ok_or_else(|| CloudError::ApiError("UpdateStack returned no stack id".to_string()))
    }

    async fn describe_stack_events(
        &self,
        stack_id: &str,
        next_token: Option<&str>,
    ) -> Result<StackEventPage> {
        let output = self
            .client
            .describe_stack_events()
            .stack_name(stack_id)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| remote_error(stack_id, e))?;

        let events = output
            .stack_events()
            .iter()
            .map(|e| {
                let timestamp: Option<&DateTime> = e.timestamp().into();
                StackEvent {
                    logical_resource_id: e.logical_resource_id().unwrap_or_default().to_string(),
                    resource_type: e.resource_type().unwrap_or_default().to_string(),
                    resource_status: e
                        .resource_status()
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_default(),
                    status_reason: e.resource_status_reason().map(str::to_string),
                    timestamp: timestamp.and_then(to_chrono),
                }
            })
            .collect();

        Ok(StackEventPage {
            events,
            next_token: output.next_token().map(str::to_string),
        })
    }
}
