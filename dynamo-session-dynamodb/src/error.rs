//! SDK error conversion.

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use dynamo_session_core::BackendError;
use std::error::Error;
use std::fmt::Debug;

/// Convert an SDK failure into a [`BackendError`].
///
/// Timeouts on either the operation or the connection become
/// [`BackendError::Timeout`]; failures to reach the endpoint become
/// [`BackendError::Connection`]; everything else, including service-side
/// errors such as throttling or a missing table, is
/// [`BackendError::Service`].
pub(crate) fn from_sdk<E, R>(operation: &'static str, err: SdkError<E, R>) -> BackendError
where
    E: Error + Send + Sync + 'static,
    R: Debug,
{
    match &err {
        SdkError::TimeoutError(_) => BackendError::Timeout(operation),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            BackendError::Timeout(operation)
        }
        SdkError::DispatchFailure(_) => {
            BackendError::connection(format!("{operation}: {}", DisplayErrorContext(&err)))
        }
        _ => BackendError::service(format!("{operation}: {}", DisplayErrorContext(&err))),
    }
}
