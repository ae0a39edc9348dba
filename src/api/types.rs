use crate::proto::ProtoBlobProperties;
use bytes::Bytes;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// BlobProperties are stored with the blob on every replica and handed back on get.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlobProperties {
    /// Set by the coordinator from the data on put.
    pub blob_size: u64,
    pub service_id: String,
    pub owner_id: Option<String>,
    pub content_type: Option<String>,
    /// `None` means the blob never expires.
    pub time_to_live: Option<Duration>,
    pub creation_time_ms: u64,
}

impl BlobProperties {
    pub fn new(service_id: impl Into<String>) -> Self {
        let creation_time_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        BlobProperties {
            blob_size: 0,
            service_id: service_id.into(),
            owner_id: None,
            content_type: None,
            time_to_live: None,
            creation_time_ms,
        }
    }
}

/// BlobOutput is what a successful get returns.
#[derive(Clone, Debug)]
pub struct BlobOutput {
    pub properties: BlobProperties,
    pub user_metadata: Bytes,
    pub data: Bytes,
}

// ------- Conversions --------

impl From<&BlobProperties> for ProtoBlobProperties {
    fn from(properties: &BlobProperties) -> Self {
        ProtoBlobProperties {
            blob_size: properties.blob_size,
            service_id: properties.service_id.clone(),
            owner_id: properties.owner_id.clone().unwrap_or_default(),
            content_type: properties.content_type.clone().unwrap_or_default(),
            time_to_live_secs: properties.time_to_live.map(|ttl| ttl.as_secs()).unwrap_or(0),
            creation_time_ms: properties.creation_time_ms,
        }
    }
}

impl From<ProtoBlobProperties> for BlobProperties {
    fn from(proto: ProtoBlobProperties) -> Self {
        fn non_empty(s: String) -> Option<String> {
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        }

        BlobProperties {
            blob_size: proto.blob_size,
            service_id: proto.service_id,
            owner_id: non_empty(proto.owner_id),
            content_type: non_empty(proto.content_type),
            time_to_live: match proto.time_to_live_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            creation_time_ms: proto.creation_time_ms,
        }
    }
}
