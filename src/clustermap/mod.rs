mod cluster_map;
mod ids;

pub use cluster_map::ClusterInfo;
pub use cluster_map::ClusterMap;
pub use cluster_map::ClusterMapError;
pub use cluster_map::Partition;
pub use cluster_map::PartitionInfo;
pub use cluster_map::PartitionState;
pub use cluster_map::ReplicaInfo;
pub use ids::BlobId;
pub use ids::BlobIdError;
pub use ids::DataNodeId;
pub use ids::PartitionId;
pub use ids::ReplicaId;
