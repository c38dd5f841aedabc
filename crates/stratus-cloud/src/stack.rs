//! Stack service abstraction and status model

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capability required when a template creates IAM resources
pub const CAPABILITY_IAM: &str = "CAPABILITY_IAM";

const SUCCEEDED_STATUSES: &[&str] = &["CREATE_COMPLETE", "UPDATE_COMPLETE"];

// DELETE_COMPLETE counts as a failure: a failed create with OnFailure=DELETE
// ends there.
const FAILED_STATUSES: &[&str] = &[
    "DELETE_COMPLETE",
    "CREATE_FAILED",
    "DELETE_FAILED",
    "ROLLBACK_FAILED",
    "ROLLBACK_COMPLETE",
];

const FAILED_RESOURCE_STATUSES: &[&str] = &["CREATE_FAILED", "DELETE_FAILED", "UPDATE_FAILED"];

/// Stack service (CloudFormation) operations used during convergence
#[async_trait]
pub trait StackService: Send + Sync {
    /// Describe a stack by name or id
    ///
    /// Returns [`CloudError::ResourceNotFound`] when the stack does not exist.
    ///
    /// [`CloudError::ResourceNotFound`]: crate::CloudError::ResourceNotFound
    async fn describe_stack(&self, stack_name_or_id: &str) -> Result<StackDescription>;

    /// Submit a create request, returning the stack id
    async fn create_stack(&self, request: &CreateStackRequest) -> Result<String>;

    /// Submit an update request, returning the stack id
    async fn update_stack(&self, request: &UpdateStackRequest) -> Result<String>;

    /// One page of stack events
    async fn describe_stack_events(
        &self,
        stack_id: &str,
        next_token: Option<&str>,
    ) -> Result<StackEventPage>;
}

/// Where a stack status sits in the convergence state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// Terminal, the requested operation succeeded
    Succeeded,
    /// Terminal, the requested operation failed
    Failed,
    /// Not terminal, keep polling
    InProgress,
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusClass::Succeeded => write!(f, "succeeded"),
            StatusClass::Failed => write!(f, "failed"),
            StatusClass::InProgress => write!(f, "in-progress"),
        }
    }
}

/// Classify a stack status string
pub fn classify_stack_status(status: &str) -> StatusClass {
    if SUCCEEDED_STATUSES.contains(&status) {
        StatusClass::Succeeded
    } else if FAILED_STATUSES.contains(&status) {
        StatusClass::Failed
    } else {
        StatusClass::InProgress
    }
}

/// Whether a per-resource event status reports a failure
pub fn is_failed_resource_status(status: &str) -> bool {
    FAILED_RESOURCE_STATUSES.contains(&status)
}

/// Action taken by the stack service when a create fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnFailure {
    Delete,
    Rollback,
    DoNothing,
}

impl OnFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnFailure::Delete => "DELETE",
            OnFailure::Rollback => "ROLLBACK",
            OnFailure::DoNothing => "DO_NOTHING",
        }
    }
}

impl std::fmt::Display for OnFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create stack request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStackRequest {
    pub stack_name: String,
    pub template_url: String,
    pub capabilities: Vec<String>,
    pub timeout_minutes: i32,
    pub on_failure: OnFailure,
}

/// Update stack request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStackRequest {
    pub stack_name: String,
    pub template_url: String,
    pub capabilities: Vec<String>,
}

/// Description of a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescription {
    pub stack_id: String,
    pub stack_name: String,
    pub status: String,
    pub status_reason: Option<String>,
    pub outputs: Vec<StackOutput>,
    pub creation_time: Option<DateTime<Utc>>,
}

impl StackDescription {
    pub fn status_class(&self) -> StatusClass {
        classify_stack_status(&self.status)
    }
}

/// A declared stack output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// A single stack event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEvent {
    pub logical_resource_id: String,
    pub resource_type: String,
    pub resource_status: String,
    pub status_reason: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl StackEvent {
    pub fn is_failure(&self) -> bool {
        is_failed_resource_status(&self.resource_status)
    }
}

/// One page of stack events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEventPage {
    pub events: Vec<StackEvent>,
    pub next_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_statuses() {
        for status in ["CREATE_COMPLETE", "UPDATE_COMPLETE"] {
            assert_eq!(classify_stack_status(status), StatusClass::Succeeded, "{}", status);
        }
    }

    #[test]
    fn test_failure_statuses() {
        for status in [
            "CREATE_FAILED",
            "DELETE_FAILED",
            "ROLLBACK_FAILED",
            "ROLLBACK_COMPLETE",
            "DELETE_COMPLETE",
        ] {
            assert_eq!(classify_stack_status(status), StatusClass::Failed, "{}", status);
        }
    }

    #[test]
    fn test_other_statuses_keep_polling() {
        for status in [
            "CREATE_IN_PROGRESS",
            "UPDATE_IN_PROGRESS",
            "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            "UPDATE_ROLLBACK_COMPLETE",
            "REVIEW_IN_PROGRESS",
            "",
            "create_complete",
        ] {
            assert_eq!(classify_stack_status(status), StatusClass::InProgress, "{}", status);
        }
    }

    #[test]
    fn test_failed_resource_statuses() {
        assert!(is_failed_resource_status("CREATE_FAILED"));
        assert!(is_failed_resource_status("UPDATE_FAILED"));
        assert!(is_failed_resource_status("DELETE_FAILED"));
        assert!(!is_failed_resource_status("CREATE_COMPLETE"));
        assert!(!is_failed_resource_status("ROLLBACK_FAILED"));
    }

    #[test]
    fn test_on_failure_serialization() {
        assert_eq!(OnFailure::Delete.as_str(), "DELETE");
        assert_eq!(
            serde_json::to_string(&OnFailure::DoNothing).unwrap(),
            "\"DO_NOTHING\""
        );
    }
}
