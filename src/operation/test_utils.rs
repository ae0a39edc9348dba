use crate::api::BlobProperties;
use crate::clustermap::{
    BlobId, ClusterInfo, ClusterMap, DataNodeId, Partition, PartitionId, PartitionInfo, PartitionState, ReplicaId,
    ReplicaInfo,
};
use crate::operation::{
    CoordinatorError, CoordinatorErrorKind, Operation, OperationContext, OperationKind, OperationPolicy,
    OperationType, RequesterPool,
};
use crate::proto::{proto_request, ProtoDeleteResp, ProtoGetResp, ProtoPutResp, ProtoRequest};
use crate::telemetry::CoordinatorMetrics;
use crate::transport::{Transport, TransportError};
use crate::wire::ServerErrorCode;
use bytes::{Bytes, BytesMut};
use prost::Message;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const TEST_DATA: &[u8] = b"some blob data";

pub(crate) fn test_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

/// Replica `i` of the partition lives on port `6000 + i`, all in "dc1".
pub(crate) fn test_partition(replica_count: usize) -> Arc<Partition> {
    let replicas = (0..replica_count)
        .map(|i| ReplicaInfo {
            hostname: "localhost".to_string(),
            port: 6000 + i as u16,
            datacenter: "dc1".to_string(),
        })
        .collect();
    let cluster_map = ClusterMap::try_new(ClusterInfo {
        partitions: vec![PartitionInfo {
            partition_id: 1,
            state: PartitionState::ReadWrite,
            replicas,
        }],
    })
    .expect("valid cluster map");

    cluster_map.partition(PartitionId::new(1)).expect("partition 1")
}

pub(crate) fn test_blob_id(replica_count: usize) -> BlobId {
    BlobId::new(test_partition(replica_count))
}

/// What a scripted replica does with a request.
#[derive(Clone, Debug)]
pub(crate) enum Reply {
    /// Replies with this error code after the delay.
    Code(ServerErrorCode),
    /// Fails as if the connection broke after the delay.
    TransportFailure,
    /// Replies with a correctly framed response for someone else's request after the delay.
    WrongCorrelationId,
    /// Never replies.
    Hang,
}

/// ScriptedTransport plays back a fixed reply per replica. Replica `i` (see `test_partition()`)
/// replies with `script[i]`. Delays determine the order in which responses reach the operation.
pub(crate) struct ScriptedTransport {
    script: HashMap<u16, (Duration, Reply)>,
    contacted: Mutex<Vec<ReplicaId>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<(Duration, Reply)>) -> Arc<Self> {
        let script = script
            .into_iter()
            .enumerate()
            .map(|(i, step)| (6000 + i as u16, step))
            .collect();

        Arc::new(ScriptedTransport {
            script,
            contacted: Mutex::new(Vec::new()),
        })
    }

    /// Shorthand for replies that arrive in the given order, 10ms apart.
    pub(crate) fn in_order(replies: Vec<Reply>) -> Arc<Self> {
        Self::new(
            replies
                .into_iter()
                .enumerate()
                .map(|(i, reply)| (Duration::from_millis(10 * (i as u64 + 1)), reply))
                .collect(),
        )
    }

    pub(crate) fn num_contacted(&self) -> usize {
        self.contacted.lock().unwrap().len()
    }

    fn respond(request: ProtoRequest, error_code: ServerErrorCode, correlation_offset: u64) -> Bytes {
        let mut buf = BytesMut::new();
        match request.request.expect("request envelope must have content") {
            proto_request::Request::Delete(delete) => ProtoDeleteResp {
                correlation_id: delete.correlation_id + correlation_offset,
                error_code: error_code.to_wire(),
            }
            .encode(&mut buf),
            proto_request::Request::Get(get) => ProtoGetResp {
                correlation_id: get.correlation_id + correlation_offset,
                error_code: error_code.to_wire(),
                properties: Some((&test_properties()).into()),
                user_metadata: b"meta".to_vec(),
                data: TEST_DATA.to_vec(),
            }
            .encode(&mut buf),
            proto_request::Request::Put(put) => ProtoPutResp {
                correlation_id: put.correlation_id + correlation_offset,
                error_code: error_code.to_wire(),
            }
            .encode(&mut buf),
        }
        .expect("encode response");

        buf.freeze()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, replica_id: &ReplicaId, request: Bytes) -> Result<Bytes, TransportError> {
        self.contacted.lock().unwrap().push(replica_id.clone());
        let (delay, reply) = self
            .script
            .get(&replica_id.data_node().port())
            .cloned()
            .expect("replica missing from script");
        let request = ProtoRequest::decode(request).expect("decodable request");

        tokio::time::sleep(delay).await;
        match reply {
            Reply::Code(error_code) => Ok(Self::respond(request, error_code, 0)),
            Reply::TransportFailure => Err(TransportError::ConnectionClosed),
            Reply::WrongCorrelationId => Ok(Self::respond(request, ServerErrorCode::NoError, 1000)),
            Reply::Hang => futures::future::pending().await,
        }
    }
}

/// InMemoryMetrics records everything it's told.
#[derive(Default)]
pub(crate) struct InMemoryMetrics {
    requests: Mutex<Vec<(OperationType, DataNodeId)>>,
    latencies: Mutex<Vec<(OperationType, DataNodeId)>>,
    outcomes: Mutex<Vec<(OperationType, Result<(), CoordinatorErrorKind>)>>,
}

impl InMemoryMetrics {
    pub(crate) fn num_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn num_latencies(&self) -> usize {
        self.latencies.lock().unwrap().len()
    }

    pub(crate) fn outcomes(&self) -> Vec<(OperationType, Result<(), CoordinatorErrorKind>)> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl CoordinatorMetrics for InMemoryMetrics {
    fn mark_request(&self, operation_type: OperationType, data_node: &DataNodeId) {
        self.requests.lock().unwrap().push((operation_type, data_node.clone()));
    }

    fn update_request_latency(&self, operation_type: OperationType, data_node: &DataNodeId, _latency: Duration) {
        self.latencies.lock().unwrap().push((operation_type, data_node.clone()));
    }

    fn mark_operation_outcome(&self, operation_type: OperationType, outcome: Result<(), CoordinatorErrorKind>) {
        self.outcomes.lock().unwrap().push((operation_type, outcome));
    }
}

pub(crate) fn test_properties() -> BlobProperties {
    let mut properties = BlobProperties::new("test-service");
    properties.blob_size = TEST_DATA.len() as u64;
    properties.content_type = Some("text/plain".to_string());
    properties.creation_time_ms = 1_600_000_000_000;
    properties
}

/// `run_operation()` executes one operation against scripted replicas with a 1 second timeout.
pub(crate) async fn run_operation<K, P>(
    kind: K,
    policy: P,
    blob_id: BlobId,
    transport: Arc<ScriptedTransport>,
    metrics: Arc<InMemoryMetrics>,
) -> Result<K::Output, CoordinatorError>
where
    K: OperationKind,
    P: OperationPolicy,
{
    let context = OperationContext::new(7, "test-client".to_string(), metrics, Duration::from_secs(1));
    let operation = Operation::new(
        &test_logger(),
        transport,
        RequesterPool::new(16),
        context,
        blob_id,
        kind,
        policy,
    );

    operation.execute().await
}
