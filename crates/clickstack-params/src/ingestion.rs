// Ingestion server stack parameters

use clickstack_config::{PipelineConfig, ResolvedResources};
use clickstack_core::naming::{bucket_key_prefix, BucketPurpose};
use clickstack_core::validate::{patterns, validate_pattern, validate_sink_batch, SinkBatch};
use clickstack_core::{BadRequestError, ProjectEnvironment, Result, ServerProtocol, SinkType};

use crate::field::{require_range, yes_no};
use crate::{ParamSet, Parameter};

const DEFAULT_SCALE_ON_CPU_PERCENT: u32 = 50;
const DEFAULT_S3_BATCH_MAX_BYTES: u64 = 30_000_000;
const DEFAULT_S3_BATCH_TIMEOUT_SECS: u64 = 300;
const DEFAULT_KINESIS_SHARD_COUNT: u32 = 3;
const DEFAULT_KINESIS_RETENTION_HOURS: u32 = 24;
const DEFAULT_KINESIS_BATCH_SIZE: u32 = 10_000;
const DEFAULT_KINESIS_BATCH_WINDOW_SECS: u32 = 300;

/// Derive the ingestion server stack parameter set.
pub fn build_ingestion_server_params(
    pipeline: &PipelineConfig,
    resources: &ResolvedResources,
) -> Result<Vec<Parameter>> {
    let server = &pipeline.ingestion_server;

    if let Some(batch) = server.sink_batch {
        validate_sink_batch(
            server.sink_type,
            SinkBatch {
                size: batch.size,
                interval_seconds: batch.interval_seconds,
            },
        )?;
    }
    if server.sink_type == SinkType::Kinesis
        && server
            .sink_kinesis
            .as_ref()
            .and_then(|k| k.stream_mode)
            .is_none()
    {
        return Err(BadRequestError::new(
            "KinesisStreamMode required for ingestion server.",
        ));
    }

    let size = &server.size;
    if size.server_max == 0 || size.server_min == 0 {
        return Err(BadRequestError::new(
            "ServerMax and ServerMin must be greater than 0.",
        ));
    }
    if size.server_max < size.server_min {
        return Err(BadRequestError::new(
            "ServerMax must be greater than or equal ServerMin.",
        ));
    }
    let scale_percent = require_range(
        "ScaleOnCpuUtilizationPercent",
        size.scale_on_cpu_utilization_percent
            .unwrap_or(DEFAULT_SCALE_ON_CPU_PERCENT),
        0,
        100,
    )?;

    let vpc_id = &pipeline.network.vpc_id;
    validate_pattern("VpcId", patterns::VPC_ID, vpc_id)?;
    let public_subnets = pipeline.network.public_subnet_ids.join(",");
    validate_pattern("PublicSubnetIds", patterns::SUBNETS, &public_subnets)?;
    let private_subnets = if pipeline.network.private_subnet_ids.is_empty() {
        public_subnets.clone()
    } else {
        pipeline.network.private_subnet_ids.join(",")
    };
    validate_pattern("PrivateSubnetIds", patterns::SUBNETS, &private_subnets)?;

    let lb = &server.load_balancer;
    let domain_name = match (lb.protocol, &server.domain) {
        (ServerProtocol::Https, Some(domain)) => {
            validate_pattern("DomainName", patterns::DOMAIN_NAME, &domain.domain_name)?;
            domain.domain_name.clone()
        }
        (ServerProtocol::Https, None) => {
            return Err(BadRequestError::new(
                "DomainName is required for an HTTPS ingestion endpoint.",
            ));
        }
        _ => String::new(),
    };
    let certificate_arn = match (lb.protocol, &server.domain) {
        (ServerProtocol::Https, Some(domain)) => domain.certificate_arn.clone(),
        _ => String::new(),
    };

    let dev_mode = resources
        .project
        .as_ref()
        .map(|p| p.environment == ProjectEnvironment::Dev)
        .unwrap_or(false);

    let log_bucket = lb.log_bucket.as_ref().unwrap_or(&pipeline.bucket);

    let mut set = ParamSet::new();
    set.push("DevMode", yes_no(dev_mode));
    set.push("ProjectId", &pipeline.project_id);
    // VPC placement
    set.push("VpcId", vpc_id);
    set.push("PublicSubnetIds", &public_subnets);
    set.push("PrivateSubnetIds", &private_subnets);
    // Domain
    set.push("DomainName", domain_name);
    set.push("ACMCertificateArn", certificate_arn);
    // Server fleet
    set.push("Protocol", lb.protocol.as_param_value());
    set.push("ServerEndpointPath", &lb.server_endpoint_path);
    set.push("ServerCorsOrigin", &lb.server_cors_origin);
    set.push("ServerMax", size.server_max.to_string());
    set.push("ServerMin", size.server_min.to_string());
    set.push(
        "WarmPoolSize",
        size.warm_pool_size.unwrap_or(0).to_string(),
    );
    set.push("ScaleOnCpuUtilizationPercent", scale_percent.to_string());
    set.push("NotificationsTopicArn", &lb.notifications_topic_arn);
    set.push(
        "EnableGlobalAccelerator",
        yes_no(lb.enable_global_accelerator),
    );
    set.push("AuthenticationSecretArn", &lb.authentication_secret_arn);
    set.push(
        "EnableAuthentication",
        yes_no(!lb.authentication_secret_arn.is_empty()),
    );
    set.push(
        "EnableApplicationLoadBalancerAccessLog",
        yes_no(lb.enable_application_load_balancer_access_log),
    );
    // Access log placement
    set.push("LogS3Bucket", &log_bucket.name);
    set.push(
        "LogS3Prefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::AlbLogs,
            Some(&log_bucket.prefix),
        ),
    );

    match server.sink_type {
        SinkType::S3 => push_s3_sink(&mut set, pipeline)?,
        SinkType::Kafka => push_kafka_sink(&mut set, pipeline, resources)?,
        SinkType::Kinesis => push_kinesis_sink(&mut set, pipeline)?,
    }

    Ok(set.into_parameters())
}

fn push_s3_sink(set: &mut ParamSet, pipeline: &PipelineConfig) -> Result<()> {
    let sink = pipeline.ingestion_server.sink_s3.as_ref();
    let bucket = sink.map(|s| &s.sink_bucket).unwrap_or(&pipeline.bucket);
    let max_bytes = require_range(
        "S3BatchMaxBytes",
        sink.and_then(|s| s.batch_max_bytes)
            .unwrap_or(DEFAULT_S3_BATCH_MAX_BYTES),
        1_000_000,
        50_000_000,
    )?;
    let timeout = require_range(
        "S3BatchTimeout",
        sink.and_then(|s| s.batch_timeout_secs)
            .unwrap_or(DEFAULT_S3_BATCH_TIMEOUT_SECS),
        30,
        1_800,
    )?;

    set.push("S3DataBucket", &bucket.name);
    set.push(
        "S3DataPrefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::DataBuffer,
            Some(&bucket.prefix),
        ),
    );
    set.push("S3BatchMaxBytes", max_bytes.to_string());
    set.push("S3BatchTimeout", timeout.to_string());
    Ok(())
}

fn push_kafka_sink(
    set: &mut ParamSet,
    pipeline: &PipelineConfig,
    resources: &ResolvedResources,
) -> Result<()> {
    let kafka = pipeline
        .ingestion_server
        .sink_kafka
        .as_ref()
        .ok_or_else(|| BadRequestError::new("Kafka sink settings required for kafka sink type."))?;

    validate_pattern(
        "MskSecurityGroupId",
        patterns::MULTI_SECURITY_GROUP,
        &kafka.security_group_id,
    )?;
    let topic = pipeline.kafka_topic();
    validate_pattern("KafkaTopic", patterns::KAFKA_TOPIC, &topic)?;

    // When a managed cluster is referenced the broker list comes from the
    // resolver, not from the raw configuration.
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

    set.push(
        "MskClusterName",
        kafka
            .msk_cluster
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
    );
    set.push("MskSecurityGroupId", &kafka.security_group_id);
    set.push("KafkaTopic", topic);
    set.push("KafkaBrokers", brokers);
    Ok(())
}

fn push_kinesis_sink(set: &mut ParamSet, pipeline: &PipelineConfig) -> Result<()> {
    let server = &pipeline.ingestion_server;
    let kinesis = server.sink_kinesis.as_ref().ok_or_else(|| {
        BadRequestError::new("Kinesis sink settings required for kinesis sink type.")
    })?;
    let stream_mode = kinesis
        .stream_mode
        .ok_or_else(|| BadRequestError::new("KinesisStreamMode required for ingestion server."))?;

    let shard_count = require_range(
        "KinesisShardCount",
        kinesis.shard_count.unwrap_or(DEFAULT_KINESIS_SHARD_COUNT),
        1,
        u32::MAX,
    )?;
    let retention_hours = require_range(
        "KinesisDataRetentionHours",
        kinesis
            .data_retention_hours
            .unwrap_or(DEFAULT_KINESIS_RETENTION_HOURS),
        24,
        8_760,
    )?;
    let batch = server.sink_batch;
    let batch_size = require_range(
        "KinesisBatchSize",
        batch.map(|b| b.size).unwrap_or(DEFAULT_KINESIS_BATCH_SIZE),
        1,
        10_000,
    )?;
    let batch_window = require_range(
        "KinesisMaxBatchingWindowSeconds",
        batch
            .map(|b| b.interval_seconds)
            .unwrap_or(DEFAULT_KINESIS_BATCH_WINDOW_SECS),
        0,
        300,
    )?;

    set.push("KinesisStreamMode", stream_mode.as_param_value());
    set.push("KinesisShardCount", shard_count.to_string());
    set.push("KinesisDataRetentionHours", retention_hours.to_string());
    set.push("KinesisBatchSize", batch_size.to_string());
    set.push(
        "KinesisMaxBatchingWindowSeconds",
        batch_window.to_string(),
    );
    set.push("KinesisDataS3Bucket", &kinesis.sink_bucket.name);
    set.push(
        "KinesisDataS3Prefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::DataBuffer,
            Some(&kinesis.sink_bucket.prefix),
        ),
    );
    Ok(())
}
