mod api;
mod clustermap;
mod operation;
mod telemetry;
mod transport;
mod wire;
mod proto {
    include!("../generated/blobstore.rs");
}

pub use api::try_create_coordinator;
pub use api::BlobOutput;
pub use api::BlobProperties;
pub use api::Coordinator;
pub use api::CoordinatorConfig;
pub use api::CoordinatorCreationError;
pub use api::CoordinatorOptions;
pub use clustermap::BlobId;
pub use clustermap::BlobIdError;
pub use clustermap::ClusterInfo;
pub use clustermap::ClusterMapError;
pub use clustermap::DataNodeId;
pub use clustermap::Partition;
pub use clustermap::PartitionId;
pub use clustermap::PartitionInfo;
pub use clustermap::PartitionState;
pub use clustermap::ReplicaId;
pub use clustermap::ReplicaInfo;
pub use operation::CoordinatorError;
pub use operation::CoordinatorErrorKind;
pub use operation::OperationType;
pub use telemetry::CoordinatorMetrics;
pub use telemetry::RecorderMetrics;
pub use transport::TcpTransport;
pub use transport::Transport;
pub use transport::TransportError;
pub use wire::ServerErrorCode;

// `crate::{root_mod}` holds no code, only `mod` and `pub use` statements. No `mod` is `pub`; public
// types are exported individually from here.
