// Kafka connector stack parameters

use clickstack_config::{PipelineConfig, ResolvedResources};
use clickstack_core::naming::{bucket_key_prefix, BucketPurpose};
use clickstack_core::validate::{
    patterns, validate_pattern, validate_sink_batch, SinkBatch,
};
use clickstack_core::{BadRequestError, Result, SinkType};

use crate::field::require_range;
use crate::{ParamSet, Parameter};

const DEFAULT_MAX_WORKER_COUNT: u32 = 3;
const DEFAULT_MIN_WORKER_COUNT: u32 = 1;
const DEFAULT_WORKER_MCU_COUNT: u32 = 1;
const DEFAULT_ROTATE_INTERVAL_MS: u64 = 3_000_000;
const DEFAULT_FLUSH_SIZE: u32 = 50_000;

/// Derive the connector stack parameter set. Only meaningful for pipelines
/// whose ingestion sink is the message broker.
pub fn build_kafka_connector_params(
    pipeline: &PipelineConfig,
    resources: &ResolvedResources,
) -> Result<Vec<Parameter>> {
    let server = &pipeline.ingestion_server;
    if server.sink_type != SinkType::Kafka {
        return Err(BadRequestError::new(
            "The connector stack requires the kafka sink type.",
        ));
    }
    let kafka = server
        .sink_kafka
        .as_ref()
        .ok_or_else(|| BadRequestError::new("Kafka sink settings required for kafka sink type."))?;

    if let Some(batch) = server.sink_batch {
        validate_sink_batch(
            server.sink_type,
            SinkBatch {
                size: batch.size,
                interval_seconds: batch.interval_seconds,
            },
        )?;
    }

    let subnet_ids = pipeline.network.private_subnet_ids.join(",");
    validate_pattern("SubnetIds", patterns::SUBNETS, &subnet_ids)?;
    validate_pattern(
        "SecurityGroupId",
        patterns::SECURITY_GROUP,
        &kafka.security_group_id,
    )?;

    let topic = pipeline.kafka_topic();
    validate_pattern("KafkaTopic", patterns::KAFKA_TOPIC, &topic)?;
    let brokers = if kafka.msk_cluster.is_some() {
        resources
            .msk_brokers
            .as_deref()
            .unwrap_or_default()
            .join(",")
    } else {
        kafka.brokers.join(",")
    };
    validate_pattern("KafkaBrokers", patterns::KAFKA_BROKERS, &brokers)?;

    let connector = &kafka.kafka_connector;
    let max_workers = require_range(
        "MaxWorkerCount",
        connector.max_worker_count.unwrap_or(DEFAULT_MAX_WORKER_COUNT),
        1,
        u32::MAX,
    )?;
    let min_workers = require_range(
        "MinWorkerCount",
        connector.min_worker_count.unwrap_or(DEFAULT_MIN_WORKER_COUNT),
        1,
        u32::MAX,
    )?;
    if max_workers < min_workers {
        return Err(BadRequestError::new(
            "MaxWorkerCount must be greater than or equal MinWorkerCount.",
        ));
    }
    let worker_mcu = require_range(
        "WorkerMcuCount",
        connector.worker_mcu_count.unwrap_or(DEFAULT_WORKER_MCU_COUNT),
        1,
        u32::MAX,
    )?;

    let rotate_interval_ms = match server.sink_batch {
        Some(batch) if batch.interval_seconds > 0 => u64::from(batch.interval_seconds) * 1_000,
        _ => DEFAULT_ROTATE_INTERVAL_MS,
    };
    let rotate_interval_ms =
        require_range("RotateIntervalMS", rotate_interval_ms, 0, 3_000_000)?;
    let flush_size = require_range(
        "FlushSize",
        server
            .sink_batch
            .map(|b| b.size)
            .unwrap_or(DEFAULT_FLUSH_SIZE),
        1,
        50_000,
    )?;

    let data_bucket = connector.sink_bucket.as_ref().unwrap_or(&pipeline.bucket);

    let mut set = ParamSet::new();
    set.push("ProjectId", &pipeline.project_id);
    set.push("DataS3Bucket", &data_bucket.name);
    set.push(
        "DataS3Prefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::DataBuffer,
            Some(&data_bucket.prefix),
        ),
    );
    set.push("LogS3Bucket", &pipeline.bucket.name);
    set.push(
        "LogS3Prefix",
        bucket_key_prefix(&pipeline.project_id, BucketPurpose::ConnectorLogs, None),
    );
    set.push("PluginS3Bucket", &pipeline.bucket.name);
    set.push(
        "PluginS3Prefix",
        bucket_key_prefix(&pipeline.project_id, BucketPurpose::ConnectorPlugin, None),
    );
    set.push("SubnetIds", subnet_ids);
    set.push("SecurityGroupId", &kafka.security_group_id);
    set.push("KafkaBrokers", brokers);
    set.push("KafkaTopic", topic);
    set.push(
        "MskClusterName",
        kafka
            .msk_cluster
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
    );
    set.push("MaxWorkerCount", max_workers.to_string());
    set.push("MinWorkerCount", min_workers.to_string());
    set.push("WorkerMcuCount", worker_mcu.to_string());
    set.push("PluginUrl", &connector.plugin_url);
    set.push("RotateIntervalMS", rotate_interval_ms.to_string());
    set.push("FlushSize", flush_size.to_string());

    Ok(set.into_parameters())
}
