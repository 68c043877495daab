// Warehouse (data analytics) stack parameters

use clickstack_config::{PipelineConfig, ResolvedResources};
use clickstack_core::naming::{bucket_key_prefix, serverless_workgroup_name, BucketPurpose};
use clickstack_core::validate::{patterns, validate_pattern};
use clickstack_core::{BadRequestError, Result, WarehouseMode};

use crate::field::{require, require_range};
use crate::{ParamSet, Parameter};

const DEFAULT_ODS_FILE_SUFFIX: &str = ".snappy.parquet";
const DEFAULT_MAX_FILES_LIMIT: u32 = 50;
const DEFAULT_PROCESSING_FILES_LIMIT: u32 = 100;
const DEFAULT_LOAD_JOB_INTERVAL: &str = "rate(5 minutes)";
const DEFAULT_UPSERT_USERS_SCHEDULE: &str = "cron(0 1 * * ? *)";
const DEFAULT_CLEAR_EXPIRED_SCHEDULE: &str = "cron(0 17 * * ? *)";
const DEFAULT_RETENTION_RANGE_DAYS: u32 = 365;
const DEFAULT_SERVERLESS_RPU: u32 = 16;

/// Derive the warehouse stack parameter set.
pub fn build_warehouse_params(
    pipeline: &PipelineConfig,
    resources: &ResolvedResources,
) -> Result<Vec<Parameter>> {
    let analytics = pipeline.data_analytics.as_ref().ok_or_else(|| {
        BadRequestError::new("Data analytics is not enabled for this pipeline.")
    })?;
    let warehouse = analytics.redshift.as_ref().ok_or_else(|| {
        BadRequestError::new("A warehouse configuration is required for the analytics stack.")
    })?;

    validate_pattern("VpcId", patterns::VPC_ID, &pipeline.network.vpc_id)?;
    let private_subnets = pipeline.network.private_subnet_ids.join(",");
    validate_pattern("PrivateSubnetIds", patterns::SUBNETS, &private_subnets)?;
    let app_ids = require(
        "AppIds",
        &resources.app_ids.as_deref().unwrap_or_default().join(","),
    )?;

    let ods_bucket = analytics
        .ods
        .as_ref()
        .map(|o| &o.bucket)
        .unwrap_or(&pipeline.bucket);
    let ods_file_suffix = analytics
        .ods
        .as_ref()
        .and_then(|o| o.file_suffix.clone())
        .unwrap_or_else(|| DEFAULT_ODS_FILE_SUFFIX.to_string());

    let load_workflow = analytics.load_workflow.as_ref();
    let load_bucket = load_workflow
        .and_then(|w| w.bucket.as_ref())
        .unwrap_or(&pipeline.bucket);
    let max_files = require_range(
        "MaxFilesLimit",
        load_workflow
            .and_then(|w| w.max_files_limit)
            .unwrap_or(DEFAULT_MAX_FILES_LIMIT),
        1,
        u32::MAX,
    )?;
    let processing_files = require_range(
        "ProcessingFilesLimit",
        load_workflow
            .and_then(|w| w.processing_files_limit)
            .unwrap_or(DEFAULT_PROCESSING_FILES_LIMIT),
        1,
        u32::MAX,
    )?;
    let load_interval = load_workflow
        .and_then(|w| w.load_job_schedule_interval_expression.clone())
        .unwrap_or_else(|| DEFAULT_LOAD_JOB_INTERVAL.to_string());
    validate_pattern(
        "LoadJobScheduleInterval",
        patterns::SCHEDULE_EXPRESSION,
        &load_interval,
    )?;
    let upsert_schedule = analytics
        .upsert_users
        .schedule_expression
        .clone()
        .unwrap_or_else(|| DEFAULT_UPSERT_USERS_SCHEDULE.to_string());
    validate_pattern(
        "UpsertUsersScheduleExpression",
        patterns::SCHEDULE_EXPRESSION,
        &upsert_schedule,
    )?;
    let clear_expired = analytics.clear_expired_events.as_ref();
    let clear_schedule = clear_expired
        .and_then(|c| c.schedule_expression.clone())
        .unwrap_or_else(|| DEFAULT_CLEAR_EXPIRED_SCHEDULE.to_string());
    validate_pattern(
        "ClearExpiredEventsScheduleExpression",
        patterns::SCHEDULE_EXPRESSION,
        &clear_schedule,
    )?;
    let retention_days = require_range(
        "ClearExpiredEventsRetentionRangeDays",
        clear_expired
            .and_then(|c| c.retention_range_days)
            .unwrap_or(DEFAULT_RETENTION_RANGE_DAYS),
        1,
        u32::MAX,
    )?;

    let mut set = ParamSet::new();
    set.push("VpcId", &pipeline.network.vpc_id);
    set.push("PrivateSubnetIds", private_subnets);
    set.push("ProjectId", &pipeline.project_id);
    set.push("AppIds", app_ids);
    set.push("ODSEventBucket", &ods_bucket.name);
    set.push(
        "ODSEventPrefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::DataOds,
            Some(&ods_bucket.prefix),
        ),
    );
    set.push("ODSEventFileSuffix", ods_file_suffix);
    set.push("LoadWorkflowBucket", &load_bucket.name);
    set.push(
        "LoadWorkflowBucketPrefix",
        bucket_key_prefix(
            &pipeline.project_id,
            BucketPurpose::DataOds,
            Some(&load_bucket.prefix),
        ),
    );
    set.push("MaxFilesLimit", max_files.to_string());
    set.push("ProcessingFilesLimit", processing_files.to_string());
    set.push("LoadJobScheduleInterval", load_interval);
    set.push("UpsertUsersScheduleExpression", upsert_schedule);
    set.push("ClearExpiredEventsScheduleExpression", clear_schedule);
    set.push(
        "ClearExpiredEventsRetentionRangeDays",
        retention_days.to_string(),
    );

    let mode = warehouse.mode();
    set.push("RedshiftMode", mode.as_param_value());
    match mode {
        WarehouseMode::Provisioned => push_provisioned(&mut set, warehouse)?,
        WarehouseMode::NewServerless => {
            push_new_serverless(&mut set, pipeline, resources, warehouse)?
        }
        WarehouseMode::ExistingServerless => {
            push_existing_serverless(&mut set, resources, warehouse)?
        }
    }

    Ok(set.into_parameters())
}

fn push_provisioned(
    set: &mut ParamSet,
    warehouse: &clickstack_config::WarehouseConfig,
) -> Result<()> {
    let provisioned = warehouse.provisioned.as_ref().ok_or_else(|| {
        BadRequestError::new("Provisioned warehouse settings missing.")
    })?;
    if provisioned.cluster_identifier.is_empty() || provisioned.db_user.is_empty() {
        return Err(BadRequestError::new(
            "Cluster Identifier and DbUser are required when using the provisioned warehouse.",
        ));
    }
    set.push("RedshiftClusterIdentifier", &provisioned.cluster_identifier);
    set.push("RedshiftDbUser", &provisioned.db_user);
    Ok(())
}

fn push_new_serverless(
    set: &mut ParamSet,
    pipeline: &PipelineConfig,
    resources: &ResolvedResources,
    warehouse: &clickstack_config::WarehouseConfig,
) -> Result<()> {
    let serverless = warehouse.new_serverless.as_ref().ok_or_else(|| {
        BadRequestError::new("New serverless warehouse settings missing.")
    })?;
    let network = &serverless.network;
    if network.vpc_id.is_empty()
        || network.subnet_ids.is_empty()
        || network.security_groups.is_empty()
    {
        return Err(BadRequestError::new(
            "VpcId, SubnetIds and SecurityGroups are required for a new serverless warehouse.",
        ));
    }
    validate_pattern("NewServerlessVpcId", patterns::VPC_ID, &network.vpc_id)?;
    let subnets = network.subnet_ids.join(",");
    validate_pattern(
        "RedshiftServerlessSubnets",
        patterns::SUBNETS_THREE_AZ,
        &subnets,
    )?;
    let security_groups = network.security_groups.join(",");
    validate_pattern(
        "RedshiftServerlessSGs",
        patterns::MULTI_SECURITY_GROUP,
        &security_groups,
    )?;
    let rpu = require_range(
        "RedshiftServerlessRPU",
        serverless.base_capacity.unwrap_or(DEFAULT_SERVERLESS_RPU),
        8,
        512,
    )?;

    // The workgroup name derives from the project identity, not user input
    let project_id = resources
        .project
        .as_ref()
        .map(|p| p.id.as_str())
        .unwrap_or(&pipeline.project_id);
    set.push(
        "NewRedshiftServerlessWorkgroupName",
        serverless_workgroup_name(project_id),
    );
    set.push("RedshiftServerlessVPCId", &network.vpc_id);
    set.push("RedshiftServerlessSubnets", subnets);
    set.push("RedshiftServerlessSGs", security_groups);
    set.push("RedshiftServerlessRPU", rpu.to_string());
    Ok(())
}

fn push_existing_serverless(
    set: &mut ParamSet,
    resources: &ResolvedResources,
    warehouse: &clickstack_config::WarehouseConfig,
) -> Result<()> {
    let existing = warehouse.existing_serverless.as_ref().ok_or_else(|| {
        BadRequestError::new("Existing serverless warehouse settings missing.")
    })?;
    let identity = resources
        .redshift
        .as_ref()
        .and_then(|r| r.serverless.as_ref())
        .ok_or_else(|| {
            BadRequestError::new(
                "Serverless warehouse identity could not be resolved for the existing workgroup.",
            )
        })?;

    set.push("RedshiftServerlessNamespaceId", &identity.namespace_id);
    set.push("RedshiftServerlessWorkgroupId", &identity.workgroup_id);
    set.push("RedshiftServerlessWorkgroupName", &identity.workgroup_name);
    set.push("RedshiftServerlessIAMRole", &existing.iam_role_arn);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{analytics_pipeline, resolved_resources, s3_pipeline, value_of};
    use clickstack_config::{
        ExistingServerlessConfig, ProvisionedWarehouseConfig, ServerlessIdentity,
        WarehouseRuntimeInfo,
    };

    #[test]
    fn new_serverless_defaults() {
        let params =
            build_warehouse_params(&analytics_pipeline(), &resolved_resources()).unwrap();

        assert_eq!(value_of(&params, "RedshiftMode").unwrap(), "New_Serverless");
        assert_eq!(
            value_of(&params, "NewRedshiftServerlessWorkgroupName").unwrap(),
            "clickstack-proj-1"
        );
        assert_eq!(value_of(&params, "RedshiftServerlessRPU").unwrap(), "16");
        assert_eq!(value_of(&params, "ODSEventFileSuffix").unwrap(), ".snappy.parquet");
        assert_eq!(
            value_of(&params, "LoadJobScheduleInterval").unwrap(),
            "rate(5 minutes)"
        );
        assert!(value_of(&params, "RedshiftClusterIdentifier").is_none());
        assert!(value_of(&params, "RedshiftServerlessNamespaceId").is_none());
    }

    #[test]
    fn provisioned_mode_emits_cluster_keys_only() {
        let mut pipeline = analytics_pipeline();
        let warehouse = pipeline
            .data_analytics
            .as_mut()
            .unwrap()
            .redshift
            .as_mut()
            .unwrap();
        warehouse.new_serverless = None;
        warehouse.provisioned = Some(ProvisionedWarehouseConfig {
            cluster_identifier: "warehouse-1".into(),
            db_user: "admin".into(),
        });

        let params = build_warehouse_params(&pipeline, &resolved_resources()).unwrap();
        assert_eq!(value_of(&params, "RedshiftMode").unwrap(), "Provisioned");
        assert_eq!(
            value_of(&params, "RedshiftClusterIdentifier").unwrap(),
            "warehouse-1"
        );
        assert!(value_of(&params, "NewRedshiftServerlessWorkgroupName").is_none());
    }

    #[test]
    fn provisioned_mode_requires_cluster_and_user() {
        let mut pipeline = analytics_pipeline();
        let warehouse = pipeline
            .data_analytics
            .as_mut()
            .unwrap()
            .redshift
            .as_mut()
            .unwrap();
        warehouse.new_serverless = None;
        warehouse.provisioned = Some(ProvisionedWarehouseConfig {
            cluster_identifier: String::new(),
            db_user: "admin".into(),
        });
        let err = build_warehouse_params(&pipeline, &resolved_resources()).unwrap_err();
        assert!(err.message().contains("Cluster Identifier"));
    }

    #[test]
    fn existing_serverless_requires_resolved_identity() {
        let mut pipeline = analytics_pipeline();
        let warehouse = pipeline
            .data_analytics
            .as_mut()
            .unwrap()
            .redshift
            .as_mut()
            .unwrap();
        warehouse.new_serverless = None;
        warehouse.existing_serverless = Some(ExistingServerlessConfig {
            workgroup_name: "external-wg".into(),
            iam_role_arn: "arn:aws:iam::123456789012:role/warehouse".into(),
        });

        let err = build_warehouse_params(&pipeline, &resolved_resources()).unwrap_err();
        assert!(err.message().contains("could not be resolved"));

        let mut resources = resolved_resources();
        resources.redshift = Some(WarehouseRuntimeInfo {
            endpoint: None,
            network: None,
            serverless: Some(ServerlessIdentity {
                namespace_id: "ns-1".into(),
                workgroup_id: "wg-id-1".into(),
                workgroup_name: "external-wg".into(),
            }),
        });
        let params = build_warehouse_params(&pipeline, &resources).unwrap();
        assert_eq!(value_of(&params, "RedshiftMode").unwrap(), "Serverless");
        assert_eq!(
            value_of(&params, "RedshiftServerlessWorkgroupName").unwrap(),
            "external-wg"
        );
    }

    #[test]
    fn new_serverless_requires_three_az_subnets() {
        let mut pipeline = analytics_pipeline();
        pipeline
            .data_analytics
            .as_mut()
            .unwrap()
            .redshift
            .as_mut()
            .unwrap()
            .new_serverless
            .as_mut()
            .unwrap()
            .network
            .subnet_ids = vec!["subnet-0a".into(), "subnet-0b".into()];
        let err = build_warehouse_params(&pipeline, &resolved_resources()).unwrap_err();
        assert!(err.message().contains("RedshiftServerlessSubnets"));
    }

    #[test]
    fn analytics_disabled_is_rejected() {
        let err = build_warehouse_params(&s3_pipeline(), &resolved_resources()).unwrap_err();
        assert!(err.message().contains("Data analytics"));
    }
}
