// Deployment intent for one pipeline, as persisted by the control plane

use clickstack_core::{ServerProtocol, SinkType, StreamMode};
use serde::{Deserialize, Serialize};

/// Root of a customer's pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub pipeline_id: String,
    pub project_id: String,
    /// Default bucket used wherever a stage omits its own
    pub bucket: BucketRef,
    pub network: NetworkConfig,
    pub ingestion_server: IngestionServerConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_processing: Option<DataProcessingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_analytics: Option<DataAnalyticsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,
}

/// Bucket name plus optional key-prefix override
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRef {
    pub name: String,
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub vpc_id: String,
    pub public_subnet_ids: Vec<String>,
    pub private_subnet_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionServerConfig {
    pub sink_type: SinkType,
    pub load_balancer: LoadBalancerConfig,
    pub size: FleetSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_s3: Option<S3SinkConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_kafka: Option<KafkaSinkConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_kinesis: Option<KinesisSinkConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_batch: Option<SinkBatchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerConfig {
    pub protocol: ServerProtocol,
    pub server_endpoint_path: String,
    #[serde(default)]
    pub server_cors_origin: String,
    #[serde(default)]
    pub notifications_topic_arn: String,
    #[serde(default)]
    pub enable_global_accelerator: bool,
    #[serde(default)]
    pub authentication_secret_arn: String,
    #[serde(default)]
    pub enable_application_load_balancer_access_log: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_bucket: Option<BucketRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSize {
    pub server_max: u32,
    pub server_min: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_pool_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_on_cpu_utilization_percent: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfig {
    pub domain_name: String,
    #[serde(default)]
    pub certificate_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3SinkConfig {
    pub sink_bucket: BucketRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_max_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaSinkConfig {
    pub brokers: Vec<String>,
    #[serde(default)]
    pub topic: String,
    pub security_group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msk_cluster: Option<MskClusterRef>,
    pub kafka_connector: KafkaConnectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MskClusterRef {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnectorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_bucket: Option<BucketRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_worker_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_worker_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_mcu_count: Option<u32>,
    #[serde(default)]
    pub plugin_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisSinkConfig {
    /// Must be chosen explicitly when the streaming sink is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_mode: Option<StreamMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_retention_hours: Option<u32>,
    pub sink_bucket: BucketRef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkBatchConfig {
    pub size: u32,
    pub interval_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProcessingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_bucket: Option<BucketRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_bucket: Option<BucketRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_bucket: Option<BucketRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_freshness_in_hour: Option<u32>,
    pub schedule_expression: String,
    #[serde(default)]
    pub output_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataAnalyticsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redshift: Option<WarehouseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ods: Option<OdsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_workflow: Option<LoadWorkflowConfig>,
    pub upsert_users: ScheduledJobConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_expired_events: Option<RetentionJobConfig>,
}

/// Exactly one of the three modes is expected to be populated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned: Option<ProvisionedWarehouseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_serverless: Option<NewServerlessConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_serverless: Option<ExistingServerlessConfig>,
}

impl WarehouseConfig {
    pub fn mode(&self) -> clickstack_core::WarehouseMode {
        use clickstack_core::WarehouseMode;
        if self.provisioned.is_some() {
            WarehouseMode::Provisioned
        } else if self.existing_serverless.is_some() {
            WarehouseMode::ExistingServerless
        } else {
            WarehouseMode::NewServerless
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedWarehouseConfig {
    #[serde(default)]
    pub cluster_identifier: String,
    #[serde(default)]
    pub db_user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServerlessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_capacity: Option<u32>,
    pub network: ServerlessNetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessNetworkConfig {
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingServerlessConfig {
    pub workgroup_name: String,
    #[serde(default)]
    pub iam_role_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OdsConfig {
    pub bucket: BucketRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_suffix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadWorkflowConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<BucketRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_files_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_job_schedule_interval_expression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledJobConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_expression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionJobConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_range_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_sight: Option<QuickSightConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSightConfig {
    pub user: String,
    #[serde(default)]
    pub namespace: String,
}

impl PipelineConfig {
    /// Topic the broker sink writes to; the project id doubles as the
    /// topic when none is configured.
    pub fn kafka_topic(&self) -> String {
        match &self.ingestion_server.sink_kafka {
            Some(kafka) if !kafka.topic.is_empty() => kafka.topic.clone(),
            _ => self.project_id.clone(),
        }
    }
}
