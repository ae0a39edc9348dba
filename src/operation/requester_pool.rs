use crate::operation::OperationRequest;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// RequesterPool runs operation requests on the tokio runtime, with a bound on how many of them may
/// be talking to replicas at the same time across all operations of a coordinator.
#[derive(Clone)]
pub(crate) struct RequesterPool {
    permits: Arc<Semaphore>,
}

impl RequesterPool {
    pub(crate) fn new(max_concurrent_requests: usize) -> Self {
        RequesterPool {
            permits: Arc::new(Semaphore::new(max_concurrent_requests)),
        }
    }

    /// `submit()` never blocks the caller. The request waits for a free slot on its own task, but no
    /// longer than its operation's deadline.
    pub(crate) fn submit(&self, request: OperationRequest) {
        let permits = self.permits.clone();
        tokio::task::spawn(async move {
            match tokio::time::timeout_at(request.deadline(), permits.acquire_owned()).await {
                Ok(Ok(_permit)) => request.run().await,
                // The semaphore is never closed.
                Ok(Err(_)) => {}
                Err(_) => request.expire(),
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::test_utils::{test_blob_id, test_logger, InMemoryMetrics, Reply, ScriptedTransport};
    use crate::clustermap::{BlobId, ReplicaId};
    use crate::operation::operation_request::RequestFailure;
    use crate::operation::{OperationContext, OperationResponse};
    use crate::transport::TransportError;
    use crate::wire::{ServerErrorCode, StoreRequest};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn request(
        transport: &Arc<ScriptedTransport>,
        sender: &mpsc::UnboundedSender<OperationResponse>,
        context: &Arc<OperationContext>,
        blob_id: &BlobId,
        replica_id: &ReplicaId,
    ) -> OperationRequest {
        OperationRequest::new(
            &test_logger(),
            transport.clone(),
            sender.clone(),
            context.clone(),
            blob_id,
            replica_id.clone(),
            StoreRequest::delete(1, "test-client", blob_id),
        )
    }

    fn context(metrics: Arc<InMemoryMetrics>, timeout: Duration) -> Arc<OperationContext> {
        Arc::new(OperationContext::new(1, "test-client".to_string(), metrics, timeout))
    }

    #[tokio::test(start_paused = true)]
    async fn bounds_requests_in_flight() {
        let blob_id = test_blob_id(3);
        let transport = ScriptedTransport::in_order(vec![Reply::Hang, Reply::Hang, Reply::Hang]);
        let metrics = Arc::new(InMemoryMetrics::default());
        let context = context(metrics.clone(), Duration::from_secs(1));
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let pool = RequesterPool::new(2);

        for replica_id in blob_id.partition().replica_ids() {
            pool.submit(request(&transport, &sender, &context, &blob_id, replica_id));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(transport.num_contacted(), 2);
        assert_eq!(pool.available_permits(), 0);

        // At the deadline the two requests in flight give up, and the one still waiting for a slot is
        // never sent at all.
        for _ in 0..3 {
            let response = receiver.recv().await.unwrap();
            assert!(matches!(
                response.result,
                Err(RequestFailure::Transport(TransportError::Timeout))
            ));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(transport.num_contacted(), 2);
        assert_eq!(metrics.num_requests(), 2);
        assert_eq!(pool.available_permits(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn request_past_its_deadline_is_not_sent() {
        let blob_id = test_blob_id(2);
        let replica_ids = blob_id.partition().replica_ids().to_vec();
        let transport = ScriptedTransport::in_order(vec![Reply::Hang, Reply::Code(ServerErrorCode::NoError)]);
        let metrics = Arc::new(InMemoryMetrics::default());
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let pool = RequesterPool::new(1);

        // The first operation holds the only slot until its deadline, which comes after the second
        // operation's deadline.
        let long_context = context(metrics.clone(), Duration::from_secs(2));
        pool.submit(request(&transport, &sender, &long_context, &blob_id, &replica_ids[0]));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let short_context = context(metrics.clone(), Duration::from_secs(1));
        pool.submit(request(&transport, &sender, &short_context, &blob_id, &replica_ids[1]));

        let response = receiver.recv().await.unwrap();
        assert_eq!(response.replica_id, replica_ids[1]);
        assert!(matches!(
            response.result,
            Err(RequestFailure::Transport(TransportError::Timeout))
        ));

        let response = receiver.recv().await.unwrap();
        assert_eq!(response.replica_id, replica_ids[0]);

        // Once the slot frees up, nothing is left to send.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(transport.num_contacted(), 1);
        assert_eq!(metrics.num_requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_request_with_free_slot_is_not_sent() {
        let blob_id = test_blob_id(1);
        let transport = ScriptedTransport::in_order(vec![Reply::Code(ServerErrorCode::NoError)]);
        let metrics = Arc::new(InMemoryMetrics::default());
        let context = context(metrics.clone(), Duration::from_millis(10));
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let pool = RequesterPool::new(1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.submit(request(&transport, &sender, &context, &blob_id, &blob_id.partition().replica_ids()[0]));

        let response = receiver.recv().await.unwrap();
        assert!(matches!(
            response.result,
            Err(RequestFailure::Transport(TransportError::Timeout))
        ));
        assert_eq!(transport.num_contacted(), 0);
        assert_eq!(metrics.num_requests(), 0);
    }
}
