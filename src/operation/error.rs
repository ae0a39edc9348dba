use crate::operation::OperationContext;

/// CoordinatorErrorKind is the single outcome of a failed operation, as seen by the caller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum CoordinatorErrorKind {
    /// Every replica of the partition reported that it doesn't have the blob.
    #[error("Blob does not exist")]
    BlobDoesNotExist,
    #[error("Blob has been deleted")]
    BlobDeleted,
    #[error("Blob has expired")]
    BlobExpired,
    /// A replica returned an error code the operation has no handling for. This is a protocol
    /// mismatch, not a transient fault, so it is never retried within the operation.
    #[error("Unexpected internal error")]
    UnexpectedInternalError,
    /// Enough replicas failed (or couldn't be reached) that the operation can no longer succeed.
    /// Can be retried with backoff.
    #[error("Insufficient replicas replied to complete the operation")]
    Unavailable,
    /// Can be retried. The blob may or may not have been changed by this attempt.
    #[error("Operation timed out")]
    OperationTimedOut,
    #[error("Invalid put argument")]
    InvalidPutArgument,
}

impl CoordinatorErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorErrorKind::BlobDoesNotExist => "blob_does_not_exist",
            CoordinatorErrorKind::BlobDeleted => "blob_deleted",
            CoordinatorErrorKind::BlobExpired => "blob_expired",
            CoordinatorErrorKind::UnexpectedInternalError => "unexpected_internal_error",
            CoordinatorErrorKind::Unavailable => "unavailable",
            CoordinatorErrorKind::OperationTimedOut => "operation_timed_out",
            CoordinatorErrorKind::InvalidPutArgument => "invalid_put_argument",
        }
    }
}

/// CoordinatorError is returned by every failed operation. It carries the operation's correlation id
/// and client id so the failure can be traced through data node logs.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message} (CorrelationId={correlation_id}, ClientId={client_id})")]
pub struct CoordinatorError {
    kind: CoordinatorErrorKind,
    message: String,
    correlation_id: u64,
    client_id: String,
}

impl CoordinatorError {
    pub(crate) fn new(context: &OperationContext, kind: CoordinatorErrorKind, message: impl Into<String>) -> Self {
        CoordinatorError {
            kind,
            message: message.into(),
            correlation_id: context.correlation_id(),
            client_id: context.client_id().to_string(),
        }
    }

    pub fn kind(&self) -> CoordinatorErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn correlation_id(&self) -> u64 {
        self.correlation_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

/// OperationFailure is a failure decided by one operation type's response handling, before the
/// driver attaches the operation's identity to it.
#[derive(Debug)]
pub(crate) struct OperationFailure {
    pub(crate) kind: CoordinatorErrorKind,
    pub(crate) message: String,
}

impl OperationFailure {
    pub(crate) fn new(kind: CoordinatorErrorKind, message: impl Into<String>) -> Self {
        OperationFailure {
            kind,
            message: message.into(),
        }
    }
}
