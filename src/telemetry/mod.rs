//! Metrics emitted by the coordinator. Metrics are fire-and-forget: nothing in the coordinator ever
//! reads them back to make a decision.
use crate::clustermap::DataNodeId;
use crate::operation::{CoordinatorErrorKind, OperationType};
use metrics::{counter, histogram};
use std::time::Duration;

pub trait CoordinatorMetrics: Send + Sync {
    /// Called right before a request is sent to a replica on `data_node`.
    fn mark_request(&self, operation_type: OperationType, data_node: &DataNodeId);

    /// Called once a response was received from `data_node`.
    fn update_request_latency(&self, operation_type: OperationType, data_node: &DataNodeId, latency: Duration);

    /// Called once per operation with its final outcome.
    fn mark_operation_outcome(&self, operation_type: OperationType, outcome: Result<(), CoordinatorErrorKind>);
}

/// RecorderMetrics reports through the `metrics` facade, so whatever recorder the application
/// installed receives them. With no recorder installed, they're discarded.
#[derive(Copy, Clone, Debug, Default)]
pub struct RecorderMetrics;

impl CoordinatorMetrics for RecorderMetrics {
    fn mark_request(&self, operation_type: OperationType, data_node: &DataNodeId) {
        counter!(
            "blob_coordinator_request_total",
            "operation" => operation_type.as_str(),
            "data_node" => data_node.to_string()
        )
        .increment(1);
    }

    fn update_request_latency(&self, operation_type: OperationType, data_node: &DataNodeId, latency: Duration) {
        histogram!(
            "blob_coordinator_request_latency_seconds",
            "operation" => operation_type.as_str(),
            "data_node" => data_node.to_string()
        )
        .record(latency.as_secs_f64());
    }

    fn mark_operation_outcome(&self, operation_type: OperationType, outcome: Result<(), CoordinatorErrorKind>) {
        let outcome = match outcome {
            Ok(()) => "success",
            Err(kind) => kind.as_str(),
        };
        counter!(
            "blob_coordinator_operation_total",
            "operation" => operation_type.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }
}
