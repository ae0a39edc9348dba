use crate::api::coordinator::Coordinator;
use crate::api::options::CoordinatorOptionsValidated;
use crate::api::CoordinatorOptions;
use crate::clustermap::{ClusterInfo, ClusterMap, ClusterMapError};
use crate::operation::RequesterPool;
use crate::telemetry::{CoordinatorMetrics, RecorderMetrics};
use crate::transport::{TcpTransport, Transport};
use std::convert::TryFrom;
use std::sync::Arc;

pub struct CoordinatorConfig {
    pub cluster_info: ClusterInfo,
    /// Replicas in this datacenter are contacted before remote ones.
    pub local_datacenter: String,
    /// Sent along with every request, so data nodes can tell who is calling.
    pub client_id: String,
    pub info_logger: slog::Logger,
    pub options: CoordinatorOptions,
    /// Defaults to TCP connections to the data nodes.
    pub transport: Option<Arc<dyn Transport>>,
    /// Defaults to the `metrics` crate facade.
    pub metrics: Option<Arc<dyn CoordinatorMetrics>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorCreationError {
    #[error("Invalid cluster info")]
    InvalidClusterInfo(#[from] ClusterMapError),
    #[error("Illegal options for configuring coordinator: {0}")]
    IllegalOptions(String),
    #[error("No replica of any partition is in local datacenter {0}")]
    UnknownLocalDatacenter(String),
}

pub fn try_create_coordinator(config: CoordinatorConfig) -> Result<Coordinator, CoordinatorCreationError> {
    let root_logger = config.info_logger;

    let options = CoordinatorOptionsValidated::try_from(config.options)
        .map_err(|e| CoordinatorCreationError::IllegalOptions(e.to_string()))?;

    let cluster_map = ClusterMap::try_new(config.cluster_info)?;
    if !cluster_map.has_datacenter(&config.local_datacenter) {
        return Err(CoordinatorCreationError::UnknownLocalDatacenter(config.local_datacenter));
    }

    let transport = config.transport.unwrap_or_else(|| {
        Arc::new(TcpTransport::new(
            root_logger.clone(),
            options.connect_timeout,
            options.request_timeout,
            options.max_idle_connections_per_node,
            options.max_frame_length(),
        ))
    });
    let metrics = config.metrics.unwrap_or_else(|| Arc::new(RecorderMetrics));

    slog::info!(
        root_logger,
        "Created coordinator for client {} in datacenter {}",
        config.client_id,
        config.local_datacenter
    );

    Ok(Coordinator::new(
        root_logger,
        cluster_map,
        config.local_datacenter,
        config.client_id,
        transport,
        metrics,
        RequesterPool::new(options.requester_pool_size),
        options.operation_timeout,
        options.max_blob_size,
    ))
}
