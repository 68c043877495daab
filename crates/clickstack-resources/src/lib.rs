// clickstack-resources - runtime facts gathered from managed services
//
// Every lookup takes an injected SDK client and follows continuation
// cursors through the shared pagination helper, so all list-style reads
// share identical pagination semantics.

pub mod acm;
pub mod quicksight;
pub mod redshift;

pub use acm::{list_issued_certificates, CertificateInfo};
pub use quicksight::{describe_account_subscription, list_bi_users, ping, BiAccountInfo, BiUser};
pub use redshift::{
    describe_clusters_in_vpc, describe_serverless_workgroup, ServerlessWorkgroupInfo,
    WarehouseClusterInfo,
};
