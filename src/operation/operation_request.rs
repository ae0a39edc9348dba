use crate::clustermap::{BlobId, ReplicaId};
use crate::operation::OperationContext;
use crate::transport::{Transport, TransportError};
use crate::wire::{StoreRequest, StoreResponse};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// OperationResponse is the outcome of one `OperationRequest`, as delivered to the operation's
/// driver. It is consumed exactly once.
#[derive(Debug)]
pub(crate) struct OperationResponse {
    pub(crate) replica_id: ReplicaId,
    pub(crate) result: Result<StoreResponse, RequestFailure>,
}

/// RequestFailure means we couldn't get an answer out of a replica. This is different from a replica
/// answering with an error code: it says nothing about whether the replica has the blob.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RequestFailure {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("Failed to encode request: {0}")]
    Encode(prost::EncodeError),
    #[error("Failed to decode response: {0}")]
    Decode(prost::DecodeError),
}

/// OperationRequest is the unit of work for one replica of one operation. It never touches the
/// operation's state. Everything it learns goes onto the operation's response queue.
pub(crate) struct OperationRequest {
    logger: slog::Logger,
    transport: Arc<dyn Transport>,
    response_sender: mpsc::UnboundedSender<OperationResponse>,
    context: Arc<OperationContext>,
    replica_id: ReplicaId,
    request: StoreRequest,
}

impl OperationRequest {
    pub(crate) fn new(
        logger: &slog::Logger,
        transport: Arc<dyn Transport>,
        response_sender: mpsc::UnboundedSender<OperationResponse>,
        context: Arc<OperationContext>,
        blob_id: &BlobId,
        replica_id: ReplicaId,
        request: StoreRequest,
    ) -> Self {
        let logger = logger.new(slog::o!(
            "BlobId" => blob_id.to_string(),
            "Replica" => replica_id.to_string(),
        ));

        OperationRequest {
            logger,
            transport,
            response_sender,
            context,
            replica_id,
            request,
        }
    }

    pub(crate) fn deadline(&self) -> Instant {
        self.context.deadline()
    }

    /// `run()` sends the request unless the operation's deadline already passed, e.g. while the
    /// request was waiting for a slot on the requester pool. Then it only reports a timeout.
    pub(crate) async fn run(self) {
        if Instant::now() >= self.deadline() {
            self.expire();
            return;
        }

        self.context
            .metrics()
            .mark_request(self.request.operation_type(), self.replica_id.data_node());

        let result = self.send_and_receive().await;
        if let Err(e) = &result {
            slog::debug!(self.logger, "Request failed: {}", e);
        }
        self.respond(result);
    }

    /// `expire()` reports a timeout for a request that was never sent.
    pub(crate) fn expire(self) {
        slog::debug!(self.logger, "Deadline passed before request was sent");
        self.respond(Err(TransportError::Timeout.into()));
    }

    fn respond(self, result: Result<StoreResponse, RequestFailure>) {
        let response = OperationResponse {
            replica_id: self.replica_id,
            result,
        };
        if self.response_sender.send(response).is_err() {
            // The operation already finished and stopped listening. Late responses are moot.
            slog::debug!(self.logger, "Dropping response of finished operation");
        }
    }

    async fn send_and_receive(&self) -> Result<StoreResponse, RequestFailure> {
        let frame = self.request.encode().map_err(RequestFailure::Encode)?;

        let start = Instant::now();
        let reply = tokio::time::timeout_at(self.context.deadline(), self.transport.send(&self.replica_id, frame))
            .await
            .map_err(|_| TransportError::Timeout)??;

        self.context.metrics().update_request_latency(
            self.request.operation_type(),
            self.replica_id.data_node(),
            start.elapsed(),
        );

        self.request.read_response(reply).map_err(RequestFailure::Decode)
    }
}
