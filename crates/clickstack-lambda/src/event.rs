// Custom-resource lifecycle contract
//
// The provisioning engine delivers Create/Update/Delete events with the
// resource properties (and, on update, the previous properties) and expects
// the physical resource id echoed back. Failure is signalled by the handler
// erroring out; the engine maps that to a FAILED deployment.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub stack_id: Option<String>,
    #[serde(default)]
    pub logical_resource_id: Option<String>,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: serde_json::Value,
    #[serde(default)]
    pub old_resource_properties: Option<serde_json::Value>,
}

impl CustomResourceEvent {
    /// Physical id to echo back: the fixed id on create, the delivered id
    /// afterwards.
    pub fn physical_id_or(&self, create_id: &str) -> String {
        match self.request_type {
            RequestType::Create => create_id.to_string(),
            _ => self
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| create_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub physical_resource_id: String,
    pub data: serde_json::Value,
    pub status: String,
}

impl CustomResourceResponse {
    pub fn success(physical_resource_id: String) -> Self {
        Self {
            physical_resource_id,
            data: serde_json::json!({}),
            status: "SUCCESS".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_an_update_event() {
        let event: CustomResourceEvent = serde_json::from_value(serde_json::json!({
            "RequestType": "Update",
            "RequestId": "req-1",
            "StackId": "stack-1",
            "LogicalResourceId": "WarehouseRoleAssociation",
            "PhysicalResourceId": "clickstack-warehouse-role-association",
            "ResourceProperties": { "roleArn": "arn:aws:iam::123456789012:role/new" },
            "OldResourceProperties": { "roleArn": "arn:aws:iam::123456789012:role/old" }
        }))
        .unwrap();

        assert_eq!(event.request_type, RequestType::Update);
        assert_eq!(
            event.resource_properties["roleArn"],
            "arn:aws:iam::123456789012:role/new"
        );
        assert!(event.old_resource_properties.is_some());
    }

    #[test]
    fn physical_id_fixed_on_create_and_echoed_after() {
        let mut event: CustomResourceEvent = serde_json::from_value(serde_json::json!({
            "RequestType": "Create",
            "ResourceProperties": {}
        }))
        .unwrap();
        assert_eq!(event.physical_id_or("fixed-id"), "fixed-id");

        event.request_type = RequestType::Delete;
        event.physical_resource_id = Some("delivered-id".into());
        assert_eq!(event.physical_id_or("fixed-id"), "delivered-id");
    }

    #[test]
    fn response_serializes_with_provider_casing() {
        let response = CustomResourceResponse::success("id-1".into());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["PhysicalResourceId"], "id-1");
        assert_eq!(json["Status"], "SUCCESS");
        assert!(json["Data"].is_object());
    }
}
