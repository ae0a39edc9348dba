use std::convert::TryFrom;
use tokio::time::Duration;

#[derive(Clone, Default)]
pub struct CoordinatorOptions {
    /// How long a whole put, get or delete may take, across all replicas.
    pub operation_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// How long a single replica may take to answer one request.
    pub request_timeout: Option<Duration>,
    /// Upper bound on replica requests in flight at once, across all operations.
    pub requester_pool_size: Option<usize>,
    pub max_idle_connections_per_node: Option<usize>,
    /// Bounds data plus user metadata of a put.
    pub max_blob_size: Option<usize>,
}

pub(super) struct CoordinatorOptionsValidated {
    pub operation_timeout: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub requester_pool_size: usize,
    pub max_idle_connections_per_node: usize,
    pub max_blob_size: usize,
}

impl CoordinatorOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.request_timeout > self.operation_timeout {
            return Err("Request timeout must not be greater than the operation timeout");
        }
        if self.connect_timeout > self.request_timeout {
            return Err("Connect timeout must not be greater than the request timeout");
        }
        if self.requester_pool_size == 0 {
            return Err("Requester pool size must be positive");
        }
        if self.max_blob_size == 0 {
            return Err("Max blob size must be positive");
        }

        Ok(())
    }

    /// Frames carry a blob and its user metadata plus the blob properties, so leave headroom for those.
    pub fn max_frame_length(&self) -> usize {
        self.max_blob_size.saturating_mul(2).max(64 * 1024)
    }
}

impl TryFrom<CoordinatorOptions> for CoordinatorOptionsValidated {
    type Error = &'static str;

    fn try_from(options: CoordinatorOptions) -> Result<Self, Self::Error> {
        let values = CoordinatorOptionsValidated {
            operation_timeout: options.operation_timeout.unwrap_or(Duration::from_secs(2)),
            connect_timeout: options.connect_timeout.unwrap_or(Duration::from_millis(500)),
            request_timeout: options.request_timeout.unwrap_or(Duration::from_secs(1)),
            requester_pool_size: options.requester_pool_size.unwrap_or(64),
            max_idle_connections_per_node: options.max_idle_connections_per_node.unwrap_or(8),
            max_blob_size: options.max_blob_size.unwrap_or(4 * 1024 * 1024),
        };

        values.validate()?;
        Ok(values)
    }
}
