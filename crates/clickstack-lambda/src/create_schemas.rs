// Create-schemas custom resource
//
// Creates the project database through a bootstrap connection, then one
// schema and ODS event table per application inside the project database.
// Update re-applies the schema statements so newly registered applications
// gain their schemas; Delete leaves the customer's data in place.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use clickstack_warehouse::{
    execute_statements_with_wait, schema, DataApiClient, ProvisionedProps, ServerlessProps,
    StatementClient, WarehouseTarget,
};

use crate::event::{CustomResourceEvent, CustomResourceResponse, RequestType};

const PHYSICAL_ID: &str = "clickstack-warehouse-schemas";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSchemasProps {
    pub project_id: String,
    /// Comma-delimited application ids
    pub app_ids: String,
    pub ods_table_name: String,
    /// Role assumed for data-API calls
    pub data_api_role: String,
    #[serde(default)]
    pub serverless_redshift_props: Option<ServerlessProps>,
    #[serde(default)]
    pub provisioned_redshift_props: Option<ProvisionedProps>,
}

impl CreateSchemasProps {
    fn target(&self) -> Result<WarehouseTarget> {
        if let Some(serverless) = &self.serverless_redshift_props {
            Ok(WarehouseTarget::Serverless(serverless.clone()))
        } else if let Some(provisioned) = &self.provisioned_redshift_props {
            Ok(WarehouseTarget::Provisioned(provisioned.clone()))
        } else {
            bail!("cannot identify the warehouse mode from the resource properties")
        }
    }

    fn app_id_list(&self) -> Vec<String> {
        self.app_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Apply the DDL for the lifecycle event against the given client.
pub(crate) async fn apply_schemas(
    client: &dyn StatementClient,
    props: &CreateSchemasProps,
    request_type: RequestType,
) -> Result<()> {
    let bootstrap_target = props.target()?;
    let project_target = bootstrap_target.with_database(&props.project_id);
    let schema_statements = schema::create_schemas(&props.app_id_list(), &props.ods_table_name);

    match request_type {
        RequestType::Create => {
            execute_statements_with_wait(
                client,
                &[schema::create_database(&props.project_id)],
                &bootstrap_target,
            )
            .await?;
            execute_statements_with_wait(client, &schema_statements, &project_target).await?;
        }
        RequestType::Update => {
            execute_statements_with_wait(client, &schema_statements, &project_target).await?;
        }
        RequestType::Delete => {
            // Data outlives the deployment on purpose
            info!(
                "retaining database {} and its schemas on delete",
                props.project_id
            );
        }
    }
    Ok(())
}

pub(crate) async fn handle(event: CustomResourceEvent) -> Result<CustomResourceResponse> {
    info!(
        "create-schemas event: {:?} {}",
        event.request_type, event.resource_properties
    );
    let props: CreateSchemasProps = serde_json::from_value(event.resource_properties.clone())
        .context("malformed resource properties")?;

    let client = data_api_client(&props.data_api_role).await;
    apply_schemas(&client, &props, event.request_type).await?;
    Ok(CustomResourceResponse::success(
        event.physical_id_or(PHYSICAL_ID),
    ))
}

/// Data-API client running under the assumed data-API role
async fn data_api_client(role_arn: &str) -> DataApiClient {
    let provider = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name("clickstack-data-api")
        .build()
        .await;
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .credentials_provider(provider)
        .load()
        .await;
    DataApiClient::new(aws_sdk_redshiftdata::Client::new(&config))
}
