// Runtime facts resolved per deployment attempt
//
// Gathered by querying managed services right before parameters are built;
// never persisted independently of the attempt that produced them.

use clickstack_core::ProjectEnvironment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectInfo>,
    /// Application ids registered under the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_ids: Option<Vec<String>>,
    /// Broker endpoints resolved from the managed cluster, when one is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msk_brokers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redshift: Option<WarehouseRuntimeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_sight_template_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: String,
    pub environment: ProjectEnvironment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseRuntimeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<WarehouseEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<WarehouseNetwork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless: Option<ServerlessIdentity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseEndpoint {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseNetwork {
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessIdentity {
    pub namespace_id: String,
    pub workgroup_id: String,
    pub workgroup_name: String,
}

/// Transform and enrichment plugins attached to the processing job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    #[serde(default)]
    pub transformer_and_enrich_class_names: Vec<String>,
    #[serde(default)]
    pub s3_path_plugin_jars: Vec<String>,
    #[serde(default)]
    pub s3_path_plugin_files: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_absent() {
        let resources = ResolvedResources::default();
        assert!(resources.project.is_none());
        assert!(resources.redshift.is_none());
        assert!(resources.quick_sight_template_arn.is_none());
    }

    #[test]
    fn deserializes_from_camel_case() {
        let json = serde_json::json!({
            "appIds": ["app1", "app2"],
            "redshift": {
                "endpoint": { "address": "wh.example.internal", "port": 5439 },
                "serverless": {
                    "namespaceId": "ns-1",
                    "workgroupId": "wg-1",
                    "workgroupName": "workgroup-one"
                }
            }
        });
        let resources: ResolvedResources = serde_json::from_value(json).unwrap();
        assert_eq!(resources.app_ids.unwrap(), vec!["app1", "app2"]);
        let redshift = resources.redshift.unwrap();
        assert_eq!(redshift.endpoint.unwrap().port, 5439);
        assert_eq!(redshift.serverless.unwrap().workgroup_name, "workgroup-one");
    }
}
