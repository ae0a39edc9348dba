use crate::clustermap::{BlobId, BlobIdError, DataNodeId, PartitionId, ReplicaId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// ClusterInfo is the static layout of the cluster, as provided by the application.
#[derive(Clone, Debug)]
pub struct ClusterInfo {
    pub partitions: Vec<PartitionInfo>,
}

#[derive(Clone, Debug)]
pub struct PartitionInfo {
    pub partition_id: u64,
    pub state: PartitionState,
    pub replicas: Vec<ReplicaInfo>,
}

#[derive(Clone, Debug)]
pub struct ReplicaInfo {
    pub hostname: String,
    pub port: u16,
    pub datacenter: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PartitionState {
    ReadWrite,
    ReadOnly,
}

/// Partition is the ordered set of replicas that hold copies of the same blobs.
#[derive(Debug)]
pub struct Partition {
    id: PartitionId,
    state: PartitionState,
    replicas: Vec<ReplicaId>,
}

impl Partition {
    pub fn id(&self) -> PartitionId {
        self.id
    }

    pub fn state(&self) -> PartitionState {
        self.state
    }

    pub fn replica_ids(&self) -> &[ReplicaId] {
        &self.replicas
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ClusterMapError {
    #[error("Cluster has no partitions")]
    NoPartitions,
    #[error("Partition {0} is declared more than once")]
    DuplicatePartition(u64),
    #[error("Partition {0} has no replicas")]
    PartitionWithoutReplicas(u64),
    #[error("Partition {partition_id} has more than one replica on data node {data_node}")]
    DuplicateReplica { partition_id: u64, data_node: String },
}

/// ClusterMap maps partitions to their replicas. It is immutable once built, so it can be shared by
/// every in-flight operation.
#[derive(Debug)]
pub struct ClusterMap {
    partitions: HashMap<PartitionId, Arc<Partition>>,
}

impl ClusterMap {
    pub fn try_new(cluster_info: ClusterInfo) -> Result<Self, ClusterMapError> {
        if cluster_info.partitions.is_empty() {
            return Err(ClusterMapError::NoPartitions);
        }

        let mut partitions = HashMap::with_capacity(cluster_info.partitions.len());
        for partition_info in cluster_info.partitions.into_iter() {
            let partition = Self::try_create_partition(partition_info)?;
            let partition_id = partition.id;
            if partitions.insert(partition_id, Arc::new(partition)).is_some() {
                return Err(ClusterMapError::DuplicatePartition(partition_id.as_u64()));
            }
        }

        Ok(ClusterMap { partitions })
    }

    fn try_create_partition(partition_info: PartitionInfo) -> Result<Partition, ClusterMapError> {
        let partition_id = PartitionId::new(partition_info.partition_id);
        if partition_info.replicas.is_empty() {
            return Err(ClusterMapError::PartitionWithoutReplicas(partition_id.as_u64()));
        }

        let mut seen_data_nodes = HashSet::with_capacity(partition_info.replicas.len());
        let mut replicas = Vec::with_capacity(partition_info.replicas.len());
        for replica_info in partition_info.replicas.into_iter() {
            let data_node = DataNodeId::from(replica_info);
            if !seen_data_nodes.insert(data_node.clone()) {
                return Err(ClusterMapError::DuplicateReplica {
                    partition_id: partition_id.as_u64(),
                    data_node: data_node.to_string(),
                });
            }
            replicas.push(ReplicaId::new(partition_id, data_node));
        }

        Ok(Partition {
            id: partition_id,
            state: partition_info.state,
            replicas,
        })
    }

    pub fn partition(&self, partition_id: PartitionId) -> Option<Arc<Partition>> {
        self.partitions.get(&partition_id).cloned()
    }

    /// `writable_partitions()` returns every partition that can accept new blobs, in partition id
    /// order.
    pub fn writable_partitions(&self) -> Vec<Arc<Partition>> {
        let mut writable: Vec<_> = self
            .partitions
            .values()
            .filter(|p| p.state == PartitionState::ReadWrite)
            .cloned()
            .collect();
        writable.sort_by_key(|p| p.id);
        writable
    }

    pub fn has_datacenter(&self, datacenter: &str) -> bool {
        self.partitions
            .values()
            .flat_map(|p| p.replicas.iter())
            .any(|replica_id| replica_id.datacenter() == datacenter)
    }

    pub fn parse_blob_id(&self, blob_id: &str) -> Result<BlobId, BlobIdError> {
        let (partition_id, uuid) = BlobId::split_str(blob_id)?;
        let partition = self
            .partition(partition_id)
            .ok_or_else(|| BlobIdError::UnknownPartition {
                blob_id: blob_id.to_string(),
                partition_id: partition_id.as_u64(),
            })?;

        Ok(BlobId::from_parts(partition, uuid.to_string()))
    }
}

impl From<ReplicaInfo> for DataNodeId {
    fn from(replica_info: ReplicaInfo) -> Self {
        DataNodeId::new(replica_info.hostname, replica_info.port, replica_info.datacenter)
    }
}
