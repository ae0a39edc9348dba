use crate::api::BlobOutput;
use crate::clustermap::{BlobId, ReplicaId};
use crate::operation::classifier::{self, NotFoundTally, ResponseClass};
use crate::operation::{
    CoordinatorErrorKind, OperationContext, OperationFailure, OperationKind, OperationType, ResponseDecision,
};
use crate::wire::{StoreRequest, StoreResponse};

/// GetOperation fetches the blob from the first replica that has it.
pub(crate) struct GetOperation {
    blob_id: BlobId,
    not_found: NotFoundTally,
    blob: Option<BlobOutput>,
}

impl GetOperation {
    pub(crate) fn new(blob_id: BlobId) -> Self {
        let not_found = NotFoundTally::new(blob_id.partition().replica_count());
        GetOperation {
            blob_id,
            not_found,
            blob: None,
        }
    }
}

impl OperationKind for GetOperation {
    type Output = BlobOutput;

    fn operation_type(&self) -> OperationType {
        OperationType::Get
    }

    fn build_request(&self, context: &OperationContext, _replica_id: &ReplicaId) -> StoreRequest {
        StoreRequest::get(context.correlation_id(), context.client_id(), &self.blob_id)
    }

    fn process_response(
        &mut self,
        _replica_id: &ReplicaId,
        response: StoreResponse,
    ) -> Result<ResponseDecision, OperationFailure> {
        let error_code = response.error_code();
        match classifier::classify(OperationType::Get, error_code) {
            ResponseClass::Success => match response {
                StoreResponse::Get(get) => match get.properties {
                    Some(properties) => {
                        self.blob = Some(BlobOutput {
                            properties,
                            user_metadata: get.user_metadata,
                            data: get.data,
                        });
                        Ok(ResponseDecision::Decisive)
                    }
                    // Replica claims success but sent a blob without properties. Try another one.
                    None => Ok(ResponseDecision::Inconclusive),
                },
                _ => Err(OperationFailure::new(
                    CoordinatorErrorKind::UnexpectedInternalError,
                    "GetOperation received a response of another operation type.",
                )),
            },
            ResponseClass::NotFound => {
                if self.not_found.record() {
                    return Err(OperationFailure::new(
                        CoordinatorErrorKind::BlobDoesNotExist,
                        format!(
                            "GetOperation : Blob not found : {} of {} replicas replied not found.",
                            self.not_found.count(),
                            self.not_found.replica_count()
                        ),
                    ));
                }
                Ok(ResponseDecision::Inconclusive)
            }
            ResponseClass::Retryable => Ok(ResponseDecision::Inconclusive),
            ResponseClass::Terminal(kind) => Err(OperationFailure::new(
                kind,
                format!("GetOperation for blob {} : replica replied {}.", self.blob_id, error_code),
            )),
            ResponseClass::Unexpected => Err(OperationFailure::new(
                CoordinatorErrorKind::UnexpectedInternalError,
                "Server returned unexpected error for GetOperation.",
            )),
        }
    }

    fn into_output(self) -> Option<BlobOutput> {
        self.blob
    }
}
