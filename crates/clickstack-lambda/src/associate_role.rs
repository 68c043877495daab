// Role-association custom resource
//
// Reconciles the data-access role attached to the warehouse: associate the
// requested role on Create, swap on Update, drop on Delete. The reconciler
// recomputes from current remote state, so provider redelivery is safe.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use clickstack_warehouse::roles::{
    reconcile_roles, ClusterRoleHost, RoleAssociation, RoleHost, ServerlessRoleHost,
};
use clickstack_warehouse::{ProvisionedProps, ServerlessProps};

use crate::event::{CustomResourceEvent, CustomResourceResponse, RequestType};

const PHYSICAL_ID: &str = "clickstack-warehouse-role-association";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssociateRoleProps {
    pub role_arn: String,
    #[serde(default)]
    pub serverless_redshift_props: Option<ServerlessProps>,
    #[serde(default)]
    pub provisioned_redshift_props: Option<ProvisionedProps>,
}

/// Role change implied by the lifecycle event
pub(crate) fn plan_association(
    event: &CustomResourceEvent,
    props: &AssociateRoleProps,
) -> Result<RoleAssociation> {
    Ok(match event.request_type {
        RequestType::Create => RoleAssociation::create(&props.role_arn),
        RequestType::Update => {
            let previous = event
                .old_resource_properties
                .as_ref()
                .map(|old| serde_json::from_value::<AssociateRoleProps>(old.clone()))
                .transpose()
                .context("malformed previous resource properties")?;
            RoleAssociation::update(&props.role_arn, previous.map(|p| p.role_arn))
        }
        RequestType::Delete => RoleAssociation::delete(&props.role_arn),
    })
}

pub(crate) async fn handle(
    event: CustomResourceEvent,
    sdk_config: &aws_config::SdkConfig,
) -> Result<CustomResourceResponse> {
    info!(
        "role association event: {:?} {}",
        event.request_type, event.resource_properties
    );
    let props: AssociateRoleProps = serde_json::from_value(event.resource_properties.clone())
        .context("malformed resource properties")?;
    let change = plan_association(&event, &props)?;

    let host: Box<dyn RoleHost> = if let Some(serverless) = &props.serverless_redshift_props {
        let client = aws_sdk_redshiftserverless::Client::new(sdk_config);
        Box::new(ServerlessRoleHost::discover(client, &serverless.workgroup_name).await?)
    } else if let Some(provisioned) = &props.provisioned_redshift_props {
        let client = aws_sdk_redshift::Client::new(sdk_config);
        Box::new(ClusterRoleHost::new(
            client,
            &provisioned.cluster_identifier,
        ))
    } else {
        bail!("cannot identify the warehouse mode from the resource properties");
    };

    reconcile_roles(host.as_ref(), &change).await?;
    Ok(CustomResourceResponse::success(
        event.physical_id_or(PHYSICAL_ID),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(request_type: &str, old_role: Option<&str>) -> CustomResourceEvent {
        let mut json = serde_json::json!({
            "RequestType": request_type,
            "PhysicalResourceId": "clickstack-warehouse-role-association",
            "ResourceProperties": {
                "roleArn": "arn:aws:iam::123456789012:role/new",
                "serverlessRedshiftProps": {
                    "workgroupName": "wg-analytics",
                    "databaseName": "proj_1"
                }
            }
        });
        if let Some(old) = old_role {
            json["OldResourceProperties"] = serde_json::json!({ "roleArn": old });
        }
        serde_json::from_value(json).unwrap()
    }

    fn props(event: &CustomResourceEvent) -> AssociateRoleProps {
        serde_json::from_value(event.resource_properties.clone()).unwrap()
    }

    #[test]
    fn create_only_associates() {
        let event = event("Create", None);
        let change = plan_association(&event, &props(&event)).unwrap();
        assert_eq!(
            change.associate.as_deref(),
            Some("arn:aws:iam::123456789012:role/new")
        );
        assert_eq!(change.disassociate, None);
    }

    #[test]
    fn update_swaps_old_for_new() {
        let event = event("Update", Some("arn:aws:iam::123456789012:role/old"));
        let change = plan_association(&event, &props(&event)).unwrap();
        assert_eq!(
            change.associate.as_deref(),
            Some("arn:aws:iam::123456789012:role/new")
        );
        assert_eq!(
            change.disassociate.as_deref(),
            Some("arn:aws:iam::123456789012:role/old")
        );
    }

    #[test]
    fn update_without_previous_properties_only_associates() {
        let event = event("Update", None);
        let change = plan_association(&event, &props(&event)).unwrap();
        assert_eq!(change.disassociate, None);
    }

    #[test]
    fn delete_only_disassociates() {
        let event = event("Delete", None);
        let change = plan_association(&event, &props(&event)).unwrap();
        assert_eq!(change.associate, None);
        assert_eq!(
            change.disassociate.as_deref(),
            Some("arn:aws:iam::123456789012:role/new")
        );
    }
}
