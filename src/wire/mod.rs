//! Typed request/response messages exchanged with data nodes, and their protobuf framing.
mod error_code;
mod messages;

pub use error_code::ServerErrorCode;
pub(crate) use messages::StoreRequest;
pub(crate) use messages::StoreResponse;
