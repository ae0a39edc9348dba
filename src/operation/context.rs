use crate::telemetry::CoordinatorMetrics;
use std::fmt;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

/// OperationContext is the identity of one client call. It is created once per operation and shared,
/// read-only, with every request that the operation sends to a replica.
pub(crate) struct OperationContext {
    correlation_id: u64,
    client_id: String,
    metrics: Arc<dyn CoordinatorMetrics>,
    deadline: Instant,
}

impl OperationContext {
    pub(crate) fn new(
        correlation_id: u64,
        client_id: String,
        metrics: Arc<dyn CoordinatorMetrics>,
        operation_timeout: Duration,
    ) -> Self {
        OperationContext {
            correlation_id,
            client_id,
            metrics,
            deadline: Instant::now() + operation_timeout,
        }
    }

    pub(crate) fn correlation_id(&self) -> u64 {
        self.correlation_id
    }

    pub(crate) fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn metrics(&self) -> &dyn CoordinatorMetrics {
        self.metrics.as_ref()
    }

    pub(crate) fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl fmt::Display for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OperationContext(CorrelationId={}, ClientId={})",
            self.correlation_id, self.client_id
        )
    }
}
