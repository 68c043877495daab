// Data processing (ETL job) stack parameters

use clickstack_config::{PipelineConfig, ResolvedResources};
use clickstack_core::naming::{bucket_key_prefix, BucketPurpose};
use clickstack_core::validate::{patterns, validate_pattern, validate_pattern_if_present};
use clickstack_core::{BadRequestError, Result, SinkType};

use crate::field::{require, require_range};
use crate::{ParamSet, Parameter};

const DEFAULT_DATA_FRESHNESS_HOURS: u32 = 72;
const DEFAULT_OUTPUT_FORMAT: &str = "parquet";

/// Derive the data processing stack parameter set.
pub fn build_data_processing_params(
    pipeline: &PipelineConfig,
    resources: &ResolvedResources,
) -> Result<Vec<Parameter>> {
    let processing = pipeline.data_processing.as_ref().ok_or_else(|| {
        BadRequestError::new("Data processing is not enabled for this pipeline.")
    })?;

    validate_pattern("VpcId", patterns::VPC_ID, &pipeline.network.vpc_id)?;
    let private_subnets = pipeline.network.private_subnet_ids.join(",");
    validate_pattern("PrivateSubnetIds", patterns::SUBNETS, &private_subnets)?;

    let app_ids = require(
        "AppIds",
        &resources.app_ids.as_deref().unwrap_or_default().join(","),
    )?;

    let freshness = require_range(
        "DataFreshnessInHour",
        processing
            .data_freshness_in_hour
            .unwrap_or(DEFAULT_DATA_FRESHNESS_HOURS),
        1,
        u32::MAX,
    )?;
    let schedule = require("ScheduleExpression", &processing.schedule_expression)?;
    validate_pattern("ScheduleExpression", patterns::SCHEDULE_EXPRESSION, &schedule)?;

    let plugins = resources.plugins.clone().unwrap_or_default();
    let plugin_jars = plugins.s3_path_plugin_jars.join(",");
    validate_pattern_if_present("S3PathPluginJars", patterns::S3_PATH_PLUGIN_JARS, &plugin_jars)?;
    let plugin_files = plugins.s3_path_plugin_files.join(",");
    validate_pattern_if_present(
        "S3PathPluginFiles",
        patterns::S3_PATH_PLUGIN_FILES,
        &plugin_files,
    )?;

    let source_bucket = processing.source_bucket.as_ref().unwrap_or(&pipeline.bucket);
    // Buffered events land under the topic subdirectory when the broker
    // sink is in front of the job.
    let mut source_prefix = bucket_key_prefix(
        &pipeline.project_id,
        BucketPurpose::DataBuffer,
        Some(&source_bucket.prefix),
    );
    if pipeline.ingestion_server.sink_type == SinkType::Kafka {
        source_prefix = format!("{source_prefix}{}/", pipeline.kafka_topic());
    }
    let sink_bucket = processing.sink_bucket.as_ref().unwrap_or(&pipeline.bucket);
    let pipeline_bucket = processing
        .pipeline_bucket
        .as_ref()
        .unwrap_or(&pipeline.bucket);

    let output_format = if processing.output_format.is_empty() {
        DEFAULT_OUTPUT_FORMAT.to_string()
    } else {
        processing.output_format.clone()
    };

    let mut set = ParamSet::new();
    set.push("VpcId", &pipeline.network.vpc_id);
    set.push("PrivateSubnetIds", private_subnets);
    set.push("ProjectId", &pipeline.project_id);
    set.push("AppIds", app_ids);
    set.push("SourceS3Bucket", &source_bucket.name);
    set.push("SourceS3Prefix", source_prefix);
    set.push("SinkS3Bucket", &sink_bucket.name);
    set.push(
        "SinkS3Prefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::DataOds,
            Some(&sink_bucket.prefix),
        ),
    );
    set.push("PipelineS3Bucket", &pipeline_bucket.name);
    set.push(
        "PipelineS3Prefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::DataPipelineTemp,
            Some(&pipeline_bucket.prefix),
        ),
    );
    set.push("DataFreshnessInHour", freshness.to_string());
    set.push("ScheduleExpression", schedule);
    set.push(
        "TransformerAndEnrichClassNames",
        plugins.transformer_and_enrich_class_names.join(","),
    );
    set.push("S3PathPluginJars", plugin_jars);
    set.push("S3PathPluginFiles", plugin_files);
    set.push("OutputFormat", output_format);

    Ok(set.into_parameters())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{kafka_pipeline, resolved_resources, s3_pipeline, value_of};
    use clickstack_config::{DataProcessingConfig, PluginInfo};

    fn with_processing(mut pipeline: clickstack_config::PipelineConfig) -> clickstack_config::PipelineConfig {
        pipeline.data_processing = Some(DataProcessingConfig {
            source_bucket: None,
            sink_bucket: None,
            pipeline_bucket: None,
            data_freshness_in_hour: None,
            schedule_expression: "rate(1 hour)".into(),
            output_format: String::new(),
        });
        pipeline
    }

    #[test]
    fn defaults_and_prefixes() {
        let pipeline = with_processing(s3_pipeline());
        let params = build_data_processing_params(&pipeline, &resolved_resources()).unwrap();

        assert_eq!(value_of(&params, "DataFreshnessInHour").unwrap(), "72");
        assert_eq!(value_of(&params, "OutputFormat").unwrap(), "parquet");
        assert_eq!(
            value_of(&params, "SourceS3Prefix").unwrap(),
            "data/buffer/proj_1/"
        );
        assert_eq!(
            value_of(&params, "SinkS3Prefix").unwrap(),
            "data/ods/proj_1/"
        );
        assert_eq!(value_of(&params, "AppIds").unwrap(), "app1,app2");
    }

    #[test]
    fn kafka_source_prefix_gains_topic_segment() {
        let pipeline = with_processing(kafka_pipeline());
        let params = build_data_processing_params(&pipeline, &resolved_resources()).unwrap();
        assert_eq!(
            value_of(&params, "SourceS3Prefix").unwrap(),
            "data/buffer/proj_1/proj_1/"
        );
    }

    #[test]
    fn missing_processing_config_is_rejected() {
        let err =
            build_data_processing_params(&s3_pipeline(), &resolved_resources()).unwrap_err();
        assert!(err.message().contains("Data processing"));
    }

    #[test]
    fn missing_app_ids_is_rejected() {
        let pipeline = with_processing(s3_pipeline());
        let mut resources = resolved_resources();
        resources.app_ids = None;
        let err = build_data_processing_params(&pipeline, &resources).unwrap_err();
        assert!(err.message().contains("AppIds"));
    }

    #[test]
    fn invalid_plugin_jar_path_is_rejected() {
        let pipeline = with_processing(s3_pipeline());
        let mut resources = resolved_resources();
        resources.plugins = Some(PluginInfo {
            transformer_and_enrich_class_names: vec!["com.example.Transformer".into()],
            s3_path_plugin_jars: vec!["https://example.com/plugin.jar".into()],
            s3_path_plugin_files: vec![],
        });
        let err = build_data_processing_params(&pipeline, &resources).unwrap_err();
        assert!(err.message().contains("S3PathPluginJars"));
    }

    #[test]
    fn valid_plugins_pass_through() {
        let pipeline = with_processing(s3_pipeline());
        let mut resources = resolved_resources();
        resources.plugins = Some(PluginInfo {
            transformer_and_enrich_class_names: vec![
                "com.example.Transformer".into(),
                "com.example.Enrich".into(),
            ],
            s3_path_plugin_jars: vec!["s3://plugins/a.jar".into(), "s3://plugins/b.jar".into()],
            s3_path_plugin_files: vec!["s3://plugins/geo.mmdb".into()],
        });
        let params = build_data_processing_params(&pipeline, &resources).unwrap();
        assert_eq!(
            value_of(&params, "TransformerAndEnrichClassNames").unwrap(),
            "com.example.Transformer,com.example.Enrich"
        );
        assert_eq!(
            value_of(&params, "S3PathPluginJars").unwrap(),
            "s3://plugins/a.jar,s3://plugins/b.jar"
        );
    }
}
