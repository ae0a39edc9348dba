use crate::clustermap::{BlobId, ReplicaId};
use crate::operation::{
    CoordinatorError, CoordinatorErrorKind, OperationContext, OperationFailure, OperationPolicy, OperationRequest,
    OperationResponse, OperationType, RequesterPool,
};
use crate::transport::Transport;
use crate::wire::{StoreRequest, StoreResponse};
use std::sync::Arc;
use tokio::sync::mpsc;

/// OperationKind is everything that differs between put, get and delete: how to build the request for
/// a replica, and what a replica's response means for the operation.
pub(crate) trait OperationKind: Send {
    type Output;

    fn operation_type(&self) -> OperationType;

    fn build_request(&self, context: &OperationContext, replica_id: &ReplicaId) -> StoreRequest;

    /// `process_response()` is called with each replica response, in arrival order, until the
    /// operation finishes. `Decisive` counts as a success towards the policy and `Inconclusive` as a
    /// failure. An `Err` ends the whole operation immediately, regardless of the policy.
    fn process_response(
        &mut self,
        replica_id: &ReplicaId,
        response: StoreResponse,
    ) -> Result<ResponseDecision, OperationFailure>;

    /// `into_output()` is only called after the policy reported the operation as complete.
    fn into_output(self) -> Option<Self::Output>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ResponseDecision {
    Decisive,
    Inconclusive,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OperationState {
    Initialized,
    Dispatched,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

/// Operation drives one client call against the replicas of one partition.
///
/// Requests to replicas run concurrently on the requester pool, but all of their results funnel back
/// through a single queue that only this driver reads. The policy and the operation kind are owned by
/// the driver and only mutated from `execute()`, which is why neither needs any synchronization.
pub(crate) struct Operation<K, P>
where
    K: OperationKind,
    P: OperationPolicy,
{
    logger: slog::Logger,
    transport: Arc<dyn Transport>,
    requester_pool: RequesterPool,
    context: Arc<OperationContext>,
    blob_id: BlobId,
    kind: K,
    policy: P,
    state: OperationState,
    response_sender: mpsc::UnboundedSender<OperationResponse>,
    response_receiver: mpsc::UnboundedReceiver<OperationResponse>,
}

impl<K, P> Operation<K, P>
where
    K: OperationKind,
    P: OperationPolicy,
{
    pub(crate) fn new(
        logger: &slog::Logger,
        transport: Arc<dyn Transport>,
        requester_pool: RequesterPool,
        context: OperationContext,
        blob_id: BlobId,
        kind: K,
        policy: P,
    ) -> Self {
        let logger = logger.new(slog::o!(
            "Operation" => kind.operation_type().as_str(),
            "CorrelationId" => context.correlation_id(),
        ));
        let (response_sender, response_receiver) = mpsc::unbounded_channel();

        Operation {
            logger,
            transport,
            requester_pool,
            context: Arc::new(context),
            blob_id,
            kind,
            policy,
            state: OperationState::Initialized,
            response_sender,
            response_receiver,
        }
    }

    pub(crate) async fn execute(mut self) -> Result<K::Output, CoordinatorError> {
        let operation_type = self.kind.operation_type();
        let result = self.run_to_completion().await;
        self.context
            .metrics()
            .mark_operation_outcome(operation_type, result.as_ref().map(|_| ()).map_err(|e| e.kind()));
        slog::debug!(self.logger, "Finished in state {:?}", self.state);

        result?;
        let context = self.context;
        self.kind.into_output().ok_or_else(|| {
            CoordinatorError::new(
                &context,
                CoordinatorErrorKind::UnexpectedInternalError,
                format!("{} completed without a result", operation_type),
            )
        })
    }

    async fn run_to_completion(&mut self) -> Result<(), CoordinatorError> {
        self.dispatch();

        loop {
            if self.policy.is_complete() {
                self.transition(OperationState::Succeeded);
                return Ok(());
            }
            if self.policy.has_failed() {
                self.transition(OperationState::Failed);
                return Err(self.error(
                    CoordinatorErrorKind::Unavailable,
                    format!(
                        "Insufficient replicas replied to complete {} for blob {} with {} replicas",
                        self.kind.operation_type(),
                        self.blob_id,
                        self.policy.replica_count()
                    ),
                ));
            }

            // Once the deadline passed, responses still sitting in the queue don't count.
            let deadline = self.context.deadline();
            let response = tokio::select! {
                biased;
                _ = tokio::time::sleep_until(deadline) => {
                    self.transition(OperationState::TimedOut);
                    return Err(self.error(
                        CoordinatorErrorKind::OperationTimedOut,
                        format!("{} for blob {} timed out", self.kind.operation_type(), self.blob_id),
                    ));
                }
                response = self.response_receiver.recv() => match response {
                    Some(response) => response,
                    // We hold a sender ourselves, so the queue can't close while we're polling.
                    None => {
                        self.transition(OperationState::Failed);
                        return Err(self.error(
                            CoordinatorErrorKind::UnexpectedInternalError,
                            "Response queue closed while polling",
                        ));
                    }
                },
            };
            self.transition(OperationState::Polling);

            if let Err(e) = self.handle_response(response) {
                self.transition(OperationState::Failed);
                return Err(e);
            }

            self.dispatch();
        }
    }

    /// `dispatch()` submits a request for every replica the policy wants to contact right now.
    fn dispatch(&mut self) {
        for replica_id in self.policy.replica_ids_for_fan_out() {
            let request = self.kind.build_request(&self.context, &replica_id);
            self.requester_pool.submit(OperationRequest::new(
                &self.logger,
                self.transport.clone(),
                self.response_sender.clone(),
                self.context.clone(),
                &self.blob_id,
                replica_id,
                request,
            ));
        }

        if self.state == OperationState::Initialized {
            self.transition(OperationState::Dispatched);
        }
    }

    fn handle_response(&mut self, response: OperationResponse) -> Result<(), CoordinatorError> {
        let replica_id = response.replica_id;
        let store_response = match response.result {
            Ok(store_response) => store_response,
            Err(failure) => {
                // Couldn't ask. Counts against the replica, but says nothing about the blob.
                slog::debug!(self.logger, "No answer from {}: {}", replica_id, failure);
                self.policy.on_failed_response(&replica_id);
                return Ok(());
            }
        };

        if store_response.correlation_id() != self.context.correlation_id() {
            slog::warn!(
                self.logger,
                "{} received response with correlation id {} from {}",
                self.context,
                store_response.correlation_id(),
                replica_id
            );
            self.policy.on_failed_response(&replica_id);
            return Ok(());
        }

        let error_code = store_response.error_code();
        match self.kind.process_response(&replica_id, store_response) {
            Ok(ResponseDecision::Decisive) => {
                slog::debug!(self.logger, "Decisive response {} from {}", error_code, replica_id);
                self.policy.on_successful_response(&replica_id);
                Ok(())
            }
            Ok(ResponseDecision::Inconclusive) => {
                slog::debug!(self.logger, "Inconclusive response {} from {}", error_code, replica_id);
                self.policy.on_failed_response(&replica_id);
                Ok(())
            }
            Err(failure) => {
                if failure.kind == CoordinatorErrorKind::UnexpectedInternalError {
                    slog::error!(
                        self.logger,
                        "{} {} response for BlobId {} received from ReplicaId {} had unexpected error code {}",
                        self.context,
                        self.kind.operation_type(),
                        self.blob_id,
                        replica_id,
                        error_code
                    );
                } else {
                    slog::trace!(self.logger, "{}", failure.message);
                }
                Err(self.error(failure.kind, failure.message))
            }
        }
    }

    fn transition(&mut self, new_state: OperationState) {
        if self.state != new_state {
            slog::debug!(self.logger, "{:?} -> {:?}", self.state, new_state);
            self.state = new_state;
        }
    }

    fn error(&self, kind: CoordinatorErrorKind, message: impl Into<String>) -> CoordinatorError {
        CoordinatorError::new(&self.context, kind, message)
    }
}
