//! Cloud service error types

use thiserror::Error;

/// Cloud service errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("No lifecycle configuration for bucket: {0}")]
    LifecycleConfigurationNotFound(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Coarse classification of a remote service failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The addressed entity (stack, role, object) does not exist
    NotFound,
    /// The bucket has no lifecycle configuration at all
    LifecycleAbsent,
    /// Anything else, including shapes we do not recognize
    Other,
}

const NOT_FOUND_CODES: &[&str] = &["NoSuchEntity", "NoSuchKey", "NotFound"];
const LIFECYCLE_ABSENT_CODE: &str = "NoSuchLifecycleConfiguration";

impl RemoteErrorKind {
    /// Classify a remote error from its structured code, falling back to
    /// message matching when the service only reports free text
    /// (CloudFormation reports a missing stack as a `ValidationError`
    /// whose message says "does not exist").
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        match code {
            Some(LIFECYCLE_ABSENT_CODE) => return RemoteErrorKind::LifecycleAbsent,
            Some(code) if NOT_FOUND_CODES.contains(&code) => return RemoteErrorKind::NotFound,
            _ => {}
        }

        if message.contains(LIFECYCLE_ABSENT_CODE) {
            RemoteErrorKind::LifecycleAbsent
        } else if message.contains("does not exist") {
            RemoteErrorKind::NotFound
        } else {
            RemoteErrorKind::Other
        }
    }
}

impl CloudError {
    /// Build an error for a failed remote call on `subject`
    pub fn from_remote(subject: &str, code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        match RemoteErrorKind::classify(code, &message) {
            RemoteErrorKind::NotFound => CloudError::ResourceNotFound(subject.to_string()),
            RemoteErrorKind::LifecycleAbsent => {
                CloudError::LifecycleConfigurationNotFound(subject.to_string())
            }
            RemoteErrorKind::Other => match code {
                Some(code) => CloudError::ApiError(format!("{}: {} ({})", subject, message, code)),
                None => CloudError::ApiError(format!("{}: {}", subject, message)),
            },
        }
    }

    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            CloudError::ResourceNotFound(_) => RemoteErrorKind::NotFound,
            CloudError::LifecycleConfigurationNotFound(_) => RemoteErrorKind::LifecycleAbsent,
            _ => RemoteErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == RemoteErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_structured_codes() {
        assert_eq!(
            RemoteErrorKind::classify(Some("NoSuchLifecycleConfiguration"), "whatever"),
            RemoteErrorKind::LifecycleAbsent
        );
        assert_eq!(
            RemoteErrorKind::classify(Some("NoSuchEntity"), "The role cannot be found"),
            RemoteErrorKind::NotFound
        );
        assert_eq!(
            RemoteErrorKind::classify(Some("AccessDenied"), "denied"),
            RemoteErrorKind::Other
        );
    }

    #[test]
    fn test_classify_message_fallback() {
        assert_eq!(
            RemoteErrorKind::classify(Some("ValidationError"), "Stack with id demo does not exist"),
            RemoteErrorKind::NotFound
        );
        assert_eq!(
            RemoteErrorKind::classify(None, "NoSuchLifecycleConfiguration: The lifecycle configuration does not exist"),
            RemoteErrorKind::LifecycleAbsent
        );
        assert_eq!(RemoteErrorKind::classify(None, "throttled"), RemoteErrorKind::Other);
    }

    #[test]
    fn test_from_remote_builds_matching_variant() {
        let err = CloudError::from_remote("demo", Some("ValidationError"), "Stack with id demo does not exist");
        assert!(err.is_not_found());

        let err = CloudError::from_remote("bucket", None, "Rate exceeded");
        assert_eq!(err.kind(), RemoteErrorKind::Other);
        assert!(err.to_string().contains("Rate exceeded"));
    }
}
