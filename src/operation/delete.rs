use crate::clustermap::{BlobId, ReplicaId};
use crate::operation::classifier::{self, NotFoundTally, ResponseClass};
use crate::operation::{
    CoordinatorErrorKind, OperationContext, OperationFailure, OperationKind, OperationType, ResponseDecision,
};
use crate::wire::{StoreRequest, StoreResponse};

/// DeleteOperation succeeds as soon as any replica confirms the blob is deleted. It fails with
/// `BlobDoesNotExist` only once every replica of the partition reported the blob as not found.
pub(crate) struct DeleteOperation {
    blob_id: BlobId,
    not_found: NotFoundTally,
}

impl DeleteOperation {
    pub(crate) fn new(blob_id: BlobId) -> Self {
        // Every replica must reply "not found" before we conclude the blob doesn't exist.
        let not_found = NotFoundTally::new(blob_id.partition().replica_count());
        DeleteOperation { blob_id, not_found }
    }
}

impl OperationKind for DeleteOperation {
    type Output = ();

    fn operation_type(&self) -> OperationType {
        OperationType::Delete
    }

    fn build_request(&self, context: &OperationContext, _replica_id: &ReplicaId) -> StoreRequest {
        StoreRequest::delete(context.correlation_id(), context.client_id(), &self.blob_id)
    }

    fn process_response(
        &mut self,
        _replica_id: &ReplicaId,
        response: StoreResponse,
    ) -> Result<ResponseDecision, OperationFailure> {
        let error_code = response.error_code();
        match classifier::classify(OperationType::Delete, error_code) {
            ResponseClass::Success => Ok(ResponseDecision::Decisive),
            // Cannot delete if blob is not found
            ResponseClass::NotFound => {
                if self.not_found.record() {
                    return Err(OperationFailure::new(
                        CoordinatorErrorKind::BlobDoesNotExist,
                        format!(
                            "DeleteOperation : Blob {} not found on any of its {} replicas.",
                            self.blob_id,
                            self.not_found.count()
                        ),
                    ));
                }
                Ok(ResponseDecision::Inconclusive)
            }
            ResponseClass::Retryable => Ok(ResponseDecision::Inconclusive),
            ResponseClass::Terminal(kind) => Err(OperationFailure::new(
                kind,
                format!("DeleteOperation failed with {}", error_code),
            )),
            ResponseClass::Unexpected => Err(OperationFailure::new(
                CoordinatorErrorKind::UnexpectedInternalError,
                "Server returned unexpected error for DeleteOperation.",
            )),
        }
    }

    fn into_output(self) -> Option<()> {
        Some(())
    }
}
