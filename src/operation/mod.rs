mod classifier;
mod context;
mod delete;
mod error;
mod get;
mod operation;
mod operation_request;
mod operation_type;
mod policy;
mod put;
mod requester_pool;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::CoordinatorError;
pub use error::CoordinatorErrorKind;
pub use operation_type::OperationType;

pub(crate) use context::OperationContext;
pub(crate) use delete::DeleteOperation;
pub(crate) use error::OperationFailure;
pub(crate) use get::GetOperation;
pub(crate) use operation::Operation;
pub(crate) use operation::OperationKind;
pub(crate) use operation::ResponseDecision;
pub(crate) use operation_request::OperationRequest;
pub(crate) use operation_request::OperationResponse;
pub(crate) use policy::AllInParallelPolicy;
pub(crate) use policy::OperationPolicy;
pub(crate) use policy::QuorumPolicy;
pub(crate) use policy::SerialPolicy;
pub(crate) use put::PutOperation;
pub(crate) use requester_pool::RequesterPool;
