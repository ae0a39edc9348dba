use crate::clustermap::ReplicaId;
use crate::transport::connection_pool::{ConnectionPool, PooledConnection};
use crate::transport::{Transport, TransportError};
use bytes::Bytes;
use tokio::time::Duration;

/// TcpTransport exchanges length-delimited frames with data nodes over pooled TCP connections.
pub struct TcpTransport {
    logger: slog::Logger,
    pool: ConnectionPool,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl TcpTransport {
    pub fn new(
        logger: slog::Logger,
        connect_timeout: Duration,
        request_timeout: Duration,
        max_idle_connections_per_node: usize,
        max_frame_length: usize,
    ) -> Self {
        TcpTransport {
            logger,
            pool: ConnectionPool::new(max_idle_connections_per_node, max_frame_length),
            connect_timeout,
            request_timeout,
        }
    }

    async fn exchange(
        &self,
        mut connection: PooledConnection,
        replica_id: &ReplicaId,
        request: Bytes,
    ) -> Result<Bytes, TransportError> {
        let response = tokio::time::timeout(self.request_timeout, connection.exchange(request))
            .await
            .map_err(|_| TransportError::Timeout)??;

        connection.mark_reusable();
        slog::trace!(self.logger, "Received {} byte response from {}", response.len(), replica_id);

        Ok(response)
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&self, replica_id: &ReplicaId, request: Bytes) -> Result<Bytes, TransportError> {
        // The connection guard is released on every path out of here, including this future being
        // dropped mid-exchange.
        let connection = self.pool.checkout(replica_id.data_node(), self.connect_timeout).await?;
        if !connection.is_reused() {
            return self.exchange(connection, replica_id, request).await;
        }

        // The data node may have closed the idle connection. Try once more on a new one.
        match self.exchange(connection, replica_id, request.clone()).await {
            Err(e @ (TransportError::ConnectionClosed | TransportError::Io(_))) => {
                slog::debug!(self.logger, "Idle connection to {} failed ({}), reconnecting", replica_id, e);
                let connection = self.pool.connect(replica_id.data_node(), self.connect_timeout).await?;
                self.exchange(connection, replica_id, request).await
            }
            result => result,
        }
    }
}
