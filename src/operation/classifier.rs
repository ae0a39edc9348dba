use crate::operation::{CoordinatorErrorKind, OperationType};
use crate::wire::ServerErrorCode;

/// ResponseClass is what a single replica's error code means for the operation that asked.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ResponseClass {
    /// The replica completed the request.
    Success,
    /// The replica couldn't serve the request right now. Another replica might.
    Retryable,
    /// The replica doesn't have the blob. Only conclusive once every replica says so.
    NotFound,
    /// The replica's answer fails the whole operation with a well known error.
    Terminal(CoordinatorErrorKind),
    /// The operation type has no handling for this code.
    Unexpected,
}

/// `classify()` buckets a server error code. The buckets depend on the operation type, e.g. delete
/// treats an already deleted blob as success, while get does not.
pub(crate) fn classify(operation_type: OperationType, error_code: ServerErrorCode) -> ResponseClass {
    match operation_type {
        OperationType::Delete => match error_code {
            ServerErrorCode::NoError | ServerErrorCode::BlobDeleted => ResponseClass::Success,
            ServerErrorCode::BlobNotFound => ResponseClass::NotFound,
            _ => ResponseClass::Unexpected,
        },
        OperationType::Get => match error_code {
            ServerErrorCode::NoError => ResponseClass::Success,
            ServerErrorCode::BlobNotFound => ResponseClass::NotFound,
            ServerErrorCode::BlobDeleted => ResponseClass::Terminal(CoordinatorErrorKind::BlobDeleted),
            ServerErrorCode::BlobExpired => ResponseClass::Terminal(CoordinatorErrorKind::BlobExpired),
            ServerErrorCode::IoError | ServerErrorCode::DataCorrupt | ServerErrorCode::DiskUnavailable => {
                ResponseClass::Retryable
            }
            _ => ResponseClass::Unexpected,
        },
        OperationType::Put => match error_code {
            ServerErrorCode::NoError => ResponseClass::Success,
            ServerErrorCode::IoError | ServerErrorCode::DiskUnavailable | ServerErrorCode::ReplicaUnavailable => {
                ResponseClass::Retryable
            }
            _ => ResponseClass::Unexpected,
        },
    }
}

/// NotFoundTally counts "not found" answers across all replicas of a partition. The threshold is
/// the partition's full replica count, read once when the operation is created.
pub(crate) struct NotFoundTally {
    not_found_count: usize,
    replica_count: usize,
}

impl NotFoundTally {
    pub(crate) fn new(replica_count: usize) -> Self {
        NotFoundTally {
            not_found_count: 0,
            replica_count,
        }
    }

    /// `record()` adds one "not found" answer and returns true once every replica has said so.
    pub(crate) fn record(&mut self) -> bool {
        self.not_found_count += 1;
        self.not_found_count == self.replica_count
    }

    pub(crate) fn count(&self) -> usize {
        self.not_found_count
    }

    pub(crate) fn replica_count(&self) -> usize {
        self.replica_count
    }
}
