// clickstack-core - shared building blocks for the deployment layer
//
// Everything here is pure: error taxonomy, string validators, resource
// naming rules, and the cursor-following pagination helper. No service
// clients live in this crate.

mod error;
pub mod naming;
pub mod paginate;
pub mod types;
pub mod validate;

pub use error::{BadRequestError, Result};
pub use types::{ProjectEnvironment, ServerProtocol, SinkType, StreamMode, WarehouseMode};
