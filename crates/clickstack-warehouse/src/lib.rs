// clickstack-warehouse - operations against the analytics warehouse
//
// Three concerns live here, all built on injected client handles so tests
// can substitute fakes:
//   - statement submission and bounded status polling (data API)
//   - IAM role association reconciled against remote state
//   - schema DDL generation for project databases

mod data_api;
pub mod roles;
pub mod schema;
mod statement;
mod target;

pub use data_api::{DataApiClient, StatementClient, StatementStatus};
pub use statement::{
    execute_statements, execute_statements_with_wait, StatementError,
};
pub use target::{ProvisionedProps, ServerlessProps, WarehouseTarget};
