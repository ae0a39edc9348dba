use crate::api::{BlobOutput, BlobProperties};
use crate::clustermap::{BlobId, BlobIdError, ClusterMap};
use crate::operation::{
    AllInParallelPolicy, CoordinatorError, CoordinatorErrorKind, DeleteOperation, GetOperation, Operation,
    OperationContext, OperationKind, OperationPolicy, OperationType, PutOperation, QuorumPolicy, RequesterPool,
    SerialPolicy,
};
use crate::telemetry::CoordinatorMetrics;
use crate::transport::Transport;
use bytes::Bytes;
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

/// Coordinator is the client-side entry point to the blob store. It turns each call into an
/// operation against the replicas of the blob's partition.
///
/// A Coordinator can be shared across tasks; every call is independent.
pub struct Coordinator {
    logger: slog::Logger,
    cluster_map: ClusterMap,
    local_datacenter: String,
    client_id: String,
    transport: Arc<dyn Transport>,
    metrics: Arc<dyn CoordinatorMetrics>,
    requester_pool: RequesterPool,
    operation_timeout: Duration,
    max_blob_size: usize,
    next_correlation_id: AtomicU64,
}

impl Coordinator {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        logger: slog::Logger,
        cluster_map: ClusterMap,
        local_datacenter: String,
        client_id: String,
        transport: Arc<dyn Transport>,
        metrics: Arc<dyn CoordinatorMetrics>,
        requester_pool: RequesterPool,
        operation_timeout: Duration,
        max_blob_size: usize,
    ) -> Self {
        Coordinator {
            logger,
            cluster_map,
            local_datacenter,
            client_id,
            transport,
            metrics,
            requester_pool,
            operation_timeout,
            max_blob_size,
            next_correlation_id: AtomicU64::new(1),
        }
    }

    pub fn parse_blob_id(&self, blob_id: &str) -> Result<BlobId, BlobIdError> {
        self.cluster_map.parse_blob_id(blob_id)
    }

    /// Succeeds once any replica confirms the blob is gone. Fails with `BlobDoesNotExist` only if
    /// every replica says it never had the blob.
    pub async fn delete_blob(&self, blob_id: &BlobId) -> Result<(), CoordinatorError> {
        let policy = AllInParallelPolicy::new(&self.local_datacenter, blob_id.partition());
        let operation = DeleteOperation::new(blob_id.clone());

        self.run(self.new_context(), blob_id.clone(), operation, policy).await
    }

    pub async fn get_blob(&self, blob_id: &BlobId) -> Result<BlobOutput, CoordinatorError> {
        let policy = SerialPolicy::new(&self.local_datacenter, blob_id.partition());
        let operation = GetOperation::new(blob_id.clone());

        self.run(self.new_context(), blob_id.clone(), operation, policy).await
    }

    /// Stores a new blob on a randomly chosen writable partition and returns its id. `blob_size` in
    /// `properties` is overwritten with the size of `data`. Data and user metadata together must fit
    /// within the max blob size.
    pub async fn put_blob(
        &self,
        mut properties: BlobProperties,
        user_metadata: Bytes,
        data: Bytes,
    ) -> Result<BlobId, CoordinatorError> {
        let context = self.new_context();

        if data.is_empty() {
            return Err(self.reject_put(&context, "Blob data must not be empty".to_string()));
        }
        // User metadata travels in the same frame as the data.
        let put_size = data.len() + user_metadata.len();
        if put_size > self.max_blob_size {
            return Err(self.reject_put(
                &context,
                format!(
                    "Blob of {} bytes with {} bytes of user metadata exceeds max blob size {}",
                    data.len(),
                    user_metadata.len(),
                    self.max_blob_size
                ),
            ));
        }

        let partition = match self
            .cluster_map
            .writable_partitions()
            .choose(&mut rand::thread_rng())
            .cloned()
        {
            Some(partition) => partition,
            None => {
                let error = CoordinatorError::new(
                    &context,
                    CoordinatorErrorKind::Unavailable,
                    "No writable partition to put blob on",
                );
                self.metrics
                    .mark_operation_outcome(OperationType::Put, Err(error.kind()));
                return Err(error);
            }
        };

        properties.blob_size = data.len() as u64;
        let blob_id = BlobId::new(partition);
        let policy = QuorumPolicy::new(&self.local_datacenter, blob_id.partition());
        let operation = PutOperation::new(blob_id.clone(), properties, user_metadata, data);

        self.run(context, blob_id, operation, policy).await
    }

    async fn run<K, P>(
        &self,
        context: OperationContext,
        blob_id: BlobId,
        kind: K,
        policy: P,
    ) -> Result<K::Output, CoordinatorError>
    where
        K: OperationKind,
        P: OperationPolicy,
    {
        Operation::new(
            &self.logger,
            self.transport.clone(),
            self.requester_pool.clone(),
            context,
            blob_id,
            kind,
            policy,
        )
        .execute()
        .await
    }

    fn new_context(&self) -> OperationContext {
        OperationContext::new(
            self.next_correlation_id.fetch_add(1, Ordering::Relaxed),
            self.client_id.clone(),
            self.metrics.clone(),
            self.operation_timeout,
        )
    }

    fn reject_put(&self, context: &OperationContext, message: String) -> CoordinatorError {
        slog::info!(self.logger, "{} rejected put: {}", context, message);
        self.metrics
            .mark_operation_outcome(OperationType::Put, Err(CoordinatorErrorKind::InvalidPutArgument));
        CoordinatorError::new(context, CoordinatorErrorKind::InvalidPutArgument, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{try_create_coordinator, CoordinatorConfig, CoordinatorCreationError, CoordinatorOptions};
    use crate::clustermap::{ClusterInfo, PartitionInfo, PartitionState, ReplicaInfo};
    use crate::operation::test_utils::{test_logger, test_properties, InMemoryMetrics, Reply, ScriptedTransport};
    use crate::wire::ServerErrorCode;

    fn cluster_info(state: PartitionState) -> ClusterInfo {
        ClusterInfo {
            partitions: vec![PartitionInfo {
                partition_id: 1,
                state,
                replicas: (0..3)
                    .map(|i| ReplicaInfo {
                        hostname: "localhost".to_string(),
                        port: 6000 + i,
                        datacenter: "dc1".to_string(),
                    })
                    .collect(),
            }],
        }
    }

    fn config(cluster_info: ClusterInfo, transport: Arc<ScriptedTransport>) -> CoordinatorConfig {
        CoordinatorConfig {
            cluster_info,
            local_datacenter: "dc1".to_string(),
            client_id: "test-client".to_string(),
            info_logger: test_logger(),
            options: CoordinatorOptions {
                max_blob_size: Some(16),
                ..Default::default()
            },
            transport: Some(transport as Arc<dyn Transport>),
            metrics: Some(Arc::new(InMemoryMetrics::default()) as Arc<dyn CoordinatorMetrics>),
        }
    }

    fn all_replicas_reply(error_code: ServerErrorCode) -> Arc<ScriptedTransport> {
        ScriptedTransport::in_order(vec![Reply::Code(error_code); 3])
    }

    #[tokio::test(start_paused = true)]
    async fn put_get_delete() {
        let transport = all_replicas_reply(ServerErrorCode::NoError);
        let coordinator = try_create_coordinator(config(cluster_info(PartitionState::ReadWrite), transport)).unwrap();

        let blob_id = coordinator
            .put_blob(test_properties(), Bytes::from_static(b"meta"), Bytes::from_static(b"data"))
            .await
            .unwrap();
        assert_eq!(blob_id.partition().id().as_u64(), 1);
        assert_eq!(coordinator.parse_blob_id(&blob_id.to_string()).unwrap(), blob_id);

        coordinator.get_blob(&blob_id).await.unwrap();
        coordinator.delete_blob(&blob_id).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_put_arguments_never_reach_replicas() {
        let transport = all_replicas_reply(ServerErrorCode::NoError);
        let coordinator =
            try_create_coordinator(config(cluster_info(PartitionState::ReadWrite), transport.clone())).unwrap();

        let empty = coordinator
            .put_blob(test_properties(), Bytes::new(), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(empty.kind(), CoordinatorErrorKind::InvalidPutArgument);

        let too_large = coordinator
            .put_blob(test_properties(), Bytes::new(), Bytes::from(vec![0u8; 17]))
            .await
            .unwrap_err();
        assert_eq!(too_large.kind(), CoordinatorErrorKind::InvalidPutArgument);

        let too_much_metadata = coordinator
            .put_blob(test_properties(), Bytes::from(vec![0u8; 13]), Bytes::from_static(b"data"))
            .await
            .unwrap_err();
        assert_eq!(too_much_metadata.kind(), CoordinatorErrorKind::InvalidPutArgument);

        // Every call gets its own correlation id.
        assert_ne!(empty.correlation_id(), too_large.correlation_id());
        assert_eq!(too_large.client_id(), "test-client");
        assert_eq!(transport.num_contacted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn put_without_writable_partition() {
        let transport = all_replicas_reply(ServerErrorCode::NoError);
        let coordinator =
            try_create_coordinator(config(cluster_info(PartitionState::ReadOnly), transport.clone())).unwrap();

        let error = coordinator
            .put_blob(test_properties(), Bytes::new(), Bytes::from_static(b"data"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), CoordinatorErrorKind::Unavailable);
        assert_eq!(transport.num_contacted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_of_unknown_blob() {
        let transport = all_replicas_reply(ServerErrorCode::BlobNotFound);
        let coordinator = try_create_coordinator(config(cluster_info(PartitionState::ReadWrite), transport)).unwrap();
        let blob_id = coordinator.parse_blob_id("1-0123456789abcdef").unwrap();

        let error = coordinator.delete_blob(&blob_id).await.unwrap_err();
        assert_eq!(error.kind(), CoordinatorErrorKind::BlobDoesNotExist);
    }

    #[test]
    fn invalid_configs() {
        let transport = all_replicas_reply(ServerErrorCode::NoError);

        let mut unknown_datacenter = config(cluster_info(PartitionState::ReadWrite), transport.clone());
        unknown_datacenter.local_datacenter = "dc9".to_string();
        match try_create_coordinator(unknown_datacenter) {
            Err(CoordinatorCreationError::UnknownLocalDatacenter(dc)) => assert_eq!(dc, "dc9"),
            other => panic!("Unexpected result: {:?}", other.err()),
        }

        let mut illegal_options = config(cluster_info(PartitionState::ReadWrite), transport.clone());
        illegal_options.options.requester_pool_size = Some(0);
        assert!(matches!(
            try_create_coordinator(illegal_options),
            Err(CoordinatorCreationError::IllegalOptions(_))
        ));

        let empty_cluster = config(ClusterInfo { partitions: vec![] }, transport);
        assert!(matches!(
            try_create_coordinator(empty_cluster),
            Err(CoordinatorCreationError::InvalidClusterInfo(_))
        ));
    }
}
