use crate::clustermap::Partition;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PartitionId(u64);

impl PartitionId {
    pub fn new(id: u64) -> Self {
        PartitionId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// DataNodeId is the address of one storage server. Many replicas (of different partitions) live on
/// the same data node, and transport connections are pooled per data node.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct DataNodeId {
    hostname: String,
    port: u16,
    datacenter: String,
}

impl DataNodeId {
    pub fn new(hostname: impl Into<String>, port: u16, datacenter: impl Into<String>) -> Self {
        DataNodeId {
            hostname: hostname.into(),
            port,
            datacenter: datacenter.into(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn datacenter(&self) -> &str {
        &self.datacenter
    }
}

impl fmt::Display for DataNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// ReplicaId identifies the copy of one partition that lives on one data node.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ReplicaId {
    partition_id: PartitionId,
    data_node: DataNodeId,
}

impl ReplicaId {
    pub fn new(partition_id: PartitionId, data_node: DataNodeId) -> Self {
        ReplicaId {
            partition_id,
            data_node,
        }
    }

    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    pub fn data_node(&self) -> &DataNodeId {
        &self.data_node
    }

    pub fn datacenter(&self) -> &str {
        self.data_node.datacenter()
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/p{}", self.data_node, self.partition_id)
    }
}

/// BlobId is the handle a client uses to address a blob. It carries the partition that owns the
/// blob, so the set of replicas to contact is known without another cluster map lookup.
#[derive(Clone)]
pub struct BlobId {
    partition: Arc<Partition>,
    uuid: String,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum BlobIdError {
    #[error("Malformed blob id '{0}'")]
    Malformed(String),
    #[error("Blob id '{blob_id}' refers to unknown partition {partition_id}")]
    UnknownPartition { blob_id: String, partition_id: u64 },
}

impl BlobId {
    /// `new()` creates a brand new blob id within the given partition.
    pub fn new(partition: Arc<Partition>) -> Self {
        let uuid = format!("{:032x}", rand::random::<u128>());
        BlobId { partition, uuid }
    }

    pub(crate) fn from_parts(partition: Arc<Partition>, uuid: String) -> Self {
        BlobId { partition, uuid }
    }

    pub fn partition(&self) -> &Arc<Partition> {
        &self.partition
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// `split_str()` splits the string form `"{partition_id}-{uuid}"` into its two parts.
    pub(crate) fn split_str(blob_id: &str) -> Result<(PartitionId, &str), BlobIdError> {
        let (partition_str, uuid) = match blob_id.find('-') {
            Some(i) => (&blob_id[..i], &blob_id[i + 1..]),
            None => return Err(BlobIdError::Malformed(blob_id.to_string())),
        };

        if uuid.is_empty() || !uuid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BlobIdError::Malformed(blob_id.to_string()));
        }

        let partition_id = partition_str
            .parse::<u64>()
            .map_err(|_| BlobIdError::Malformed(blob_id.to_string()))?;

        Ok((PartitionId::new(partition_id), uuid))
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.partition.id(), self.uuid)
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self)
    }
}

impl PartialEq for BlobId {
    fn eq(&self, other: &Self) -> bool {
        self.partition.id() == other.partition.id() && self.uuid == other.uuid
    }
}

impl Eq for BlobId {}

impl Hash for BlobId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.partition.id().hash(state);
        self.uuid.hash(state);
    }
}
