mod connection_pool;
mod tcp;

pub use tcp::TcpTransport;

use crate::clustermap::ReplicaId;
use bytes::Bytes;
use std::io;

/// Transport sends one framed request to a replica and returns the framed response.
///
/// Implementations must release whatever they acquired (e.g. a pooled connection) on every exit path,
/// including when the returned future is dropped before it completes. An operation that reached its
/// deadline simply stops polling the requests it still has in flight.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, replica_id: &ReplicaId, request: Bytes) -> Result<Bytes, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to connect to {data_node}: {source}")]
    Connect { data_node: String, source: io::Error },
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
    #[error("Timed out waiting for replica")]
    Timeout,
    #[error("Connection closed by data node")]
    ConnectionClosed,
}
