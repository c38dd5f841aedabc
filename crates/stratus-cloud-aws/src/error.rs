//! Mapping of AWS SDK errors onto `CloudError`

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use stratus_cloud::CloudError;

/// Convert an SDK error for a call on `subject` into a classified [`CloudError`]
///
/// The structured error code is preferred; the message is only consulted
/// when the service reports the condition as free text.
pub(crate) fn remote_error<E, R>(subject: &str, err: SdkError<E, R>) -> CloudError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    tracing::debug!("AWS error on {}: code={:?} message={}", subject, code, message);
    CloudError::from_remote(subject, code.as_deref(), message)
}

/// Convert a smithy timestamp to chrono
pub(crate) fn to_chrono(
    timestamp: &aws_sdk_s3::primitives::DateTime,
) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}
