// Warehouse lookups: provisioned clusters by VPC, serverless workgroup
// identity for existing-serverless pipelines

use anyhow::{Context, Result};
use clickstack_config::WarehouseEndpoint;
use clickstack_core::paginate::{fetch_all_pages, Page};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseClusterInfo {
    pub name: String,
    pub node_type: String,
    pub endpoint: Option<WarehouseEndpoint>,
    pub status: String,
}

/// List every provisioned cluster placed in `vpc_id`.
pub async fn describe_clusters_in_vpc(
    client: &aws_sdk_redshift::Client,
    vpc_id: &str,
) -> Result<Vec<WarehouseClusterInfo>> {
    let clusters = fetch_all_pages(|marker: Option<String>| async move {
        let output = client.describe_clusters().set_marker(marker).send().await?;
        Ok::<_, anyhow::Error>(Page::new(
            output.clusters().to_vec(),
            output.marker().map(str::to_string),
        ))
    })
    .await?;

    info!("listed {} clusters, filtering by vpc {vpc_id}", clusters.len());
    Ok(clusters
        .into_iter()
        .filter(|cluster| cluster.vpc_id() == Some(vpc_id))
        .map(|cluster| WarehouseClusterInfo {
            name: cluster.cluster_identifier().unwrap_or_default().to_string(),
            node_type: cluster.node_type().unwrap_or_default().to_string(),
            endpoint: cluster.endpoint().and_then(|endpoint| {
                Some(WarehouseEndpoint {
                    address: endpoint.address()?.to_string(),
                    port: u16::try_from(endpoint.port().unwrap_or(0)).ok()?,
                })
            }),
            status: cluster.cluster_status().unwrap_or_default().to_string(),
        })
        .collect())
}

/// Identity and endpoint of an existing serverless workgroup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerlessWorkgroupInfo {
    pub namespace_id: String,
    pub workgroup_id: String,
    pub workgroup_name: String,
    pub endpoint: Option<WarehouseEndpoint>,
}

/// Resolve a serverless workgroup to its namespace and endpoint.
pub async fn describe_serverless_workgroup(
    client: &aws_sdk_redshiftserverless::Client,
    workgroup_name: &str,
) -> Result<ServerlessWorkgroupInfo> {
    let workgroup_output = client
        .get_workgroup()
        .workgroup_name(workgroup_name)
        .send()
        .await?;
    let workgroup = workgroup_output
        .workgroup()
        .with_context(|| format!("workgroup {workgroup_name} not found"))?;
    let namespace_name = workgroup
        .namespace_name()
        .with_context(|| format!("workgroup {workgroup_name} has no namespace"))?;

    let namespace_output = client
        .get_namespace()
        .namespace_name(namespace_name)
        .send()
        .await?;
    let namespace = namespace_output
        .namespace()
        .with_context(|| format!("namespace {namespace_name} not found"))?;

    Ok(ServerlessWorkgroupInfo {
        namespace_id: namespace.namespace_id().unwrap_or_default().to_string(),
        workgroup_id: workgroup.workgroup_id().unwrap_or_default().to_string(),
        workgroup_name: workgroup
            .workgroup_name()
            .unwrap_or(workgroup_name)
            .to_string(),
        endpoint: workgroup.endpoint().and_then(|endpoint| {
            Some(WarehouseEndpoint {
                address: endpoint.address()?.to_string(),
                port: u16::try_from(endpoint.port().unwrap_or(0)).ok()?,
            })
        }),
    })
}
