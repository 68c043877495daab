// Statement submission seam over the warehouse data API

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::WarehouseTarget;

/// Last observed status of a submitted statement
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatementStatus {
    pub fn is_finished(&self) -> bool {
        self.status == "FINISHED"
    }

    pub fn is_failed(&self) -> bool {
        self.status == "FAILED"
    }

    /// Status payload as carried in failure messages
    pub fn payload(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.status.clone())
    }
}

/// Data-API seam: submit one statement, submit a batch, inspect status.
/// Implemented against the managed service and by in-memory fakes in tests.
#[async_trait]
pub trait StatementClient: Send + Sync {
    async fn execute(&self, sql: &str, target: &WarehouseTarget) -> Result<String>;

    async fn batch_execute(&self, sqls: &[String], target: &WarehouseTarget) -> Result<String>;

    async fn describe(&self, statement_id: &str) -> Result<StatementStatus>;
}

/// Redshift Data API implementation
#[derive(Clone)]
pub struct DataApiClient {
    client: aws_sdk_redshiftdata::Client,
}

impl DataApiClient {
    pub fn new(client: aws_sdk_redshiftdata::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatementClient for DataApiClient {
    async fn execute(&self, sql: &str, target: &WarehouseTarget) -> Result<String> {
        let mut request = self
            .client
            .execute_statement()
            .sql(sql)
            .database(target.database())
            .with_event(true);
        match target {
            WarehouseTarget::Serverless(props) => {
                request = request.workgroup_name(&props.workgroup_name);
            }
            WarehouseTarget::Provisioned(props) => {
                request = request
                    .cluster_identifier(&props.cluster_identifier)
                    .db_user(&props.db_user);
            }
        }
        let output = request.send().await?;
        output
            .id()
            .map(str::to_string)
            .context("execute_statement returned no statement id")
    }

    async fn batch_execute(&self, sqls: &[String], target: &WarehouseTarget) -> Result<String> {
        let mut request = self
            .client
            .batch_execute_statement()
            .set_sqls(Some(sqls.to_vec()))
            .database(target.database())
            .with_event(true);
        match target {
            WarehouseTarget::Serverless(props) => {
                request = request.workgroup_name(&props.workgroup_name);
            }
            WarehouseTarget::Provisioned(props) => {
                request = request
                    .cluster_identifier(&props.cluster_identifier)
                    .db_user(&props.db_user);
            }
        }
        let output = request.send().await?;
        output
            .id()
            .map(str::to_string)
            .context("batch_execute_statement returned no statement id")
    }

    async fn describe(&self, statement_id: &str) -> Result<StatementStatus> {
        let output = self
            .client
            .describe_statement()
            .id(statement_id)
            .send()
            .await?;
        Ok(StatementStatus {
            status: output
                .status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            error: output.error().map(str::to_string),
        })
    }
}
