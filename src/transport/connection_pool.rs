use crate::clustermap::DataNodeId;
use crate::transport::TransportError;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpStream;
use tokio::time::Duration;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

type Connection = Framed<TcpStream, LengthDelimitedCodec>;

/// ConnectionPool keeps idle connections to data nodes around so they can be reused by later
/// requests. It's shared by every operation of a coordinator.
#[derive(Clone)]
pub(crate) struct ConnectionPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    idle: Mutex<HashMap<DataNodeId, Vec<Connection>>>,
    max_idle_per_node: usize,
    max_frame_length: usize,
}

impl PoolInner {
    // Critical sections never panic, so a poisoned lock still holds a consistent map.
    fn lock_idle(&self) -> MutexGuard<'_, HashMap<DataNodeId, Vec<Connection>>> {
        match self.idle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn take_idle(&self, data_node: &DataNodeId) -> Option<Connection> {
        self.lock_idle().get_mut(data_node).and_then(|connections| connections.pop())
    }

    fn give_back(&self, data_node: DataNodeId, connection: Connection) {
        let mut idle = self.lock_idle();
        let connections = idle.entry(data_node).or_insert_with(Vec::new);
        if connections.len() < self.max_idle_per_node {
            connections.push(connection);
        }
    }
}

impl ConnectionPool {
    pub(crate) fn new(max_idle_per_node: usize, max_frame_length: usize) -> Self {
        ConnectionPool {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(HashMap::new()),
                max_idle_per_node,
                max_frame_length,
            }),
        }
    }

    /// `checkout()` hands out an idle connection to `data_node` if there is one, or opens a new one.
    /// An idle connection may have been closed by the data node in the meantime, see
    /// `PooledConnection::is_reused()`.
    pub(crate) async fn checkout(
        &self,
        data_node: &DataNodeId,
        connect_timeout: Duration,
    ) -> Result<PooledConnection, TransportError> {
        if let Some(connection) = self.inner.take_idle(data_node) {
            let mut connection = PooledConnection::new(connection, data_node.clone(), self.inner.clone());
            connection.reused = true;
            return Ok(connection);
        }

        self.connect(data_node, connect_timeout).await
    }

    /// `connect()` always opens a new connection to `data_node`.
    pub(crate) async fn connect(
        &self,
        data_node: &DataNodeId,
        connect_timeout: Duration,
    ) -> Result<PooledConnection, TransportError> {
        let connect = TcpStream::connect((data_node.hostname(), data_node.port()));
        let stream = tokio::time::timeout(connect_timeout, connect)
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|e| TransportError::Connect {
                data_node: data_node.to_string(),
                source: e,
            })?;
        stream.set_nodelay(true)?;

        let codec = LengthDelimitedCodec::builder()
            .max_frame_length(self.inner.max_frame_length)
            .new_codec();
        let connection = Framed::new(stream, codec);

        Ok(PooledConnection::new(connection, data_node.clone(), self.inner.clone()))
    }

    #[cfg(test)]
    pub(crate) fn num_idle(&self, data_node: &DataNodeId) -> usize {
        self.inner.lock_idle().get(data_node).map(Vec::len).unwrap_or(0)
    }
}

/// PooledConnection is a checked out connection. When dropped, it goes back to the pool only if
/// `mark_reusable()` was called, i.e. the last exchange completed cleanly. Otherwise the connection
/// may still have a partial frame in either direction, so it's closed instead.
pub(crate) struct PooledConnection {
    connection: Option<Connection>,
    data_node: DataNodeId,
    pool: Arc<PoolInner>,
    reused: bool,
    reusable: bool,
}

impl PooledConnection {
    fn new(connection: Connection, data_node: DataNodeId, pool: Arc<PoolInner>) -> Self {
        PooledConnection {
            connection: Some(connection),
            data_node,
            pool,
            reused: false,
            reusable: false,
        }
    }

    /// `exchange()` writes one request frame and waits for exactly one response frame.
    pub(crate) async fn exchange(&mut self, request: Bytes) -> Result<Bytes, TransportError> {
        let connection = match self.connection.as_mut() {
            Some(c) => c,
            None => return Err(TransportError::ConnectionClosed),
        };

        connection.send(request).await?;
        match connection.next().await {
            Some(Ok(frame)) => Ok(frame.freeze()),
            Some(Err(e)) => Err(TransportError::Io(e)),
            None => Err(TransportError::ConnectionClosed),
        }
    }

    /// True if the connection sat idle in the pool before this checkout.
    pub(crate) fn is_reused(&self) -> bool {
        self.reused
    }

    pub(crate) fn mark_reusable(&mut self) {
        self.reusable = true;
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if !self.reusable {
            return;
        }
        if let Some(connection) = self.connection.take() {
            self.pool.give_back(self.data_node.clone(), connection);
        }
    }
}
