//! This mod holds the library's client-facing API.
mod coordinator;
mod options;
mod types;
mod wiring;

pub use coordinator::Coordinator;
pub use options::CoordinatorOptions;
pub use types::BlobOutput;
pub use types::BlobProperties;
pub use wiring::try_create_coordinator;
pub use wiring::CoordinatorConfig;
pub use wiring::CoordinatorCreationError;
