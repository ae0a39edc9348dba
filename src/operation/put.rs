use crate::api::BlobProperties;
use crate::clustermap::{BlobId, ReplicaId};
use crate::operation::classifier::{self, ResponseClass};
use crate::operation::{
    CoordinatorErrorKind, OperationContext, OperationFailure, OperationKind, OperationType, ResponseDecision,
};
use crate::wire::{StoreRequest, StoreResponse};
use bytes::Bytes;

/// PutOperation writes a new blob to the replicas of its partition.
pub(crate) struct PutOperation {
    blob_id: BlobId,
    properties: BlobProperties,
    user_metadata: Bytes,
    data: Bytes,
}

impl PutOperation {
    pub(crate) fn new(blob_id: BlobId, properties: BlobProperties, user_metadata: Bytes, data: Bytes) -> Self {
        PutOperation {
            blob_id,
            properties,
            user_metadata,
            data,
        }
    }
}

impl OperationKind for PutOperation {
    type Output = BlobId;

    fn operation_type(&self) -> OperationType {
        OperationType::Put
    }

    fn build_request(&self, context: &OperationContext, _replica_id: &ReplicaId) -> StoreRequest {
        StoreRequest::put(
            context.correlation_id(),
            context.client_id(),
            &self.blob_id,
            &self.properties,
            &self.user_metadata,
            &self.data,
        )
    }

    fn process_response(
        &mut self,
        _replica_id: &ReplicaId,
        response: StoreResponse,
    ) -> Result<ResponseDecision, OperationFailure> {
        let error_code = response.error_code();
        match classifier::classify(OperationType::Put, error_code) {
            ResponseClass::Success => Ok(ResponseDecision::Decisive),
            ResponseClass::Retryable | ResponseClass::NotFound => Ok(ResponseDecision::Inconclusive),
            ResponseClass::Terminal(kind) => Err(OperationFailure::new(
                kind,
                format!("PutOperation failed with {}", error_code),
            )),
            ResponseClass::Unexpected => Err(OperationFailure::new(
                CoordinatorErrorKind::UnexpectedInternalError,
                "Server returned unexpected error for PutOperation.",
            )),
        }
    }

    fn into_output(self) -> Option<BlobId> {
        Some(self.blob_id)
    }
}
