// Reporting stack parameters
//
// The report stack reads the warehouse either directly (provisioned or
// existing serverless, endpoint known at build time) or through outputs of
// the analytics stack (new serverless, endpoint known only after that stack
// deploys). The latter case emits cross-stack sentinel values.

use clickstack_config::{PipelineConfig, ResolvedResources};
use clickstack_core::naming::{stack_name, StackKind};
use clickstack_core::validate::{patterns, validate_pattern};
use clickstack_core::{BadRequestError, Result, WarehouseMode};

use crate::field::require;
use crate::{outputs, ParamSet, Parameter};

const DEFAULT_QUICKSIGHT_NAMESPACE: &str = "default";

/// Derive the reporting stack parameter set.
pub fn build_report_params(
    pipeline: &PipelineConfig,
    resources: &ResolvedResources,
) -> Result<Vec<Parameter>> {
    let template_arn = resources
        .quick_sight_template_arn
        .as_deref()
        .filter(|arn| !arn.is_empty())
        .ok_or_else(|| {
            BadRequestError::new("The BI template ARN could not be resolved.")
        })?;
    let analytics = pipeline.data_analytics.as_ref().ok_or_else(|| {
        BadRequestError::new(
            "Reporting requires the data analytics engine to be enabled first.",
        )
    })?;
    let warehouse = analytics.redshift.as_ref().ok_or_else(|| {
        BadRequestError::new("A warehouse configuration is required for reporting.")
    })?;

    let quick_sight = pipeline
        .report
        .as_ref()
        .and_then(|r| r.quick_sight.as_ref())
        .ok_or_else(|| BadRequestError::new("QuickSight settings required for reporting."))?;
    let user = require("QuickSightUserParam", &quick_sight.user)?;
    validate_pattern("QuickSightUserParam", patterns::QUICKSIGHT_USER_NAME, &user)?;
    let namespace = if quick_sight.namespace.is_empty() {
        DEFAULT_QUICKSIGHT_NAMESPACE.to_string()
    } else {
        quick_sight.namespace.clone()
    };
    validate_pattern(
        "QuickSightNamespaceParam",
        patterns::QUICKSIGHT_NAMESPACE,
        &namespace,
    )?;

    let app_ids = require(
        "RedshiftDBSchemaParam",
        &resources.app_ids.as_deref().unwrap_or_default().join(","),
    )?;

    let analytics_stack = stack_name(
        &pipeline.pipeline_id,
        StackKind::DataAnalytics,
        pipeline.ingestion_server.sink_type,
    );

    let mode = warehouse.mode();
    let (endpoint, port) = match mode {
        WarehouseMode::NewServerless => (
            format!(
                "#.{analytics_stack}.{}",
                outputs::SERVERLESS_WORKGROUP_ENDPOINT_ADDRESS
            ),
            format!(
                "#.{analytics_stack}.{}",
                outputs::SERVERLESS_WORKGROUP_ENDPOINT_PORT
            ),
        ),
        WarehouseMode::Provisioned | WarehouseMode::ExistingServerless => {
            let endpoint = resources
                .redshift
                .as_ref()
                .and_then(|r| r.endpoint.as_ref())
                .ok_or_else(|| {
                    BadRequestError::new("The warehouse endpoint could not be resolved.")
                })?;
            (endpoint.address.clone(), endpoint.port.to_string())
        }
    };

    let (vpc_subnets, vpc_security_groups) = match mode {
        WarehouseMode::NewServerless => {
            let network = warehouse
                .new_serverless
                .as_ref()
                .map(|s| &s.network)
                .ok_or_else(|| {
                    BadRequestError::new("New serverless warehouse settings missing.")
                })?;
            (
                network.subnet_ids.join(","),
                network.security_groups.join(","),
            )
        }
        WarehouseMode::Provisioned | WarehouseMode::ExistingServerless => {
            let network = resources
                .redshift
                .as_ref()
                .and_then(|r| r.network.as_ref())
                .ok_or_else(|| {
                    BadRequestError::new("The warehouse network info could not be resolved.")
                })?;
            (
                network.subnet_ids.join(","),
                network.security_groups.join(","),
            )
        }
    };

    let mut set = ParamSet::new();
    set.push("QuickSightUserParam", user);
    set.push("QuickSightNamespaceParam", namespace);
    set.push("RedshiftDBParam", &pipeline.project_id);
    set.push("RedshiftDBSchemaParam", app_ids);
    set.push("QuickSightTemplateArnParam", template_arn);
    set.push("RedshiftEndpointParam", endpoint);
    set.push("RedshiftPortParam", port);
    set.push("QuickSightVpcConnectionSubnetParam", vpc_subnets);
    set.push("QuickSightVpcConnectionSGParam", vpc_security_groups);
    set.push(
        "RedshiftParameterKeyParam",
        format!(
            "#.{analytics_stack}.{}",
            outputs::BI_USER_CREDENTIAL_PARAMETER
        ),
    );

    Ok(set.into_parameters())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{analytics_pipeline, resolved_resources, value_of};
    use clickstack_config::{
        QuickSightConfig, ReportConfig, WarehouseEndpoint, WarehouseNetwork,
        WarehouseRuntimeInfo,
    };

    fn report_pipeline() -> clickstack_config::PipelineConfig {
        let mut pipeline = analytics_pipeline();
        pipeline.report = Some(ReportConfig {
            quick_sight: Some(QuickSightConfig {
                user: "analyst".into(),
                namespace: String::new(),
            }),
        });
        pipeline
    }

    fn report_resources() -> clickstack_config::ResolvedResources {
        let mut resources = resolved_resources();
        resources.quick_sight_template_arn = Some(
            "arn:aws:quicksight:us-east-1:123456789012:template/clickstack".into(),
        );
        resources
    }

    #[test]
    fn new_serverless_emits_cross_stack_sentinels() {
        let params = build_report_params(&report_pipeline(), &report_resources()).unwrap();

        let endpoint = params
            .iter()
            .find(|p| p.parameter_key == "RedshiftEndpointParam.#")
            .expect("endpoint key rewritten");
        assert!(endpoint
            .parameter_value
            .starts_with("#.Clickstack-DataAnalytics-pipe-1."));
        assert!(params
            .iter()
            .any(|p| p.parameter_key == "RedshiftPortParam.#"));
        assert!(params
            .iter()
            .any(|p| p.parameter_key == "RedshiftParameterKeyParam.#"));
        assert_eq!(
            value_of(&params, "QuickSightNamespaceParam").unwrap(),
            "default"
        );
    }

    #[test]
    fn resolved_endpoint_used_for_existing_modes() {
        let mut pipeline = report_pipeline();
        let warehouse = pipeline
            .data_analytics
            .as_mut()
            .unwrap()
            .redshift
            .as_mut()
            .unwrap();
        warehouse.new_serverless = None;
        warehouse.provisioned = Some(clickstack_config::ProvisionedWarehouseConfig {
            cluster_identifier: "warehouse-1".into(),
            db_user: "admin".into(),
        });
        let mut resources = report_resources();
        resources.redshift = Some(WarehouseRuntimeInfo {
            endpoint: Some(WarehouseEndpoint {
                address: "warehouse-1.example.internal".into(),
                port: 5439,
            }),
            network: Some(WarehouseNetwork {
                subnet_ids: vec!["subnet-0x".into(), "subnet-0y".into()],
                security_groups: vec!["sg-9999ffff".into()],
            }),
            serverless: None,
        });

        let params = build_report_params(&pipeline, &resources).unwrap();
        assert_eq!(
            value_of(&params, "RedshiftEndpointParam").unwrap(),
            "warehouse-1.example.internal"
        );
        assert_eq!(value_of(&params, "RedshiftPortParam").unwrap(), "5439");
        assert_eq!(
            value_of(&params, "QuickSightVpcConnectionSubnetParam").unwrap(),
            "subnet-0x,subnet-0y"
        );
    }

    #[test]
    fn missing_template_arn_is_rejected() {
        let err =
            build_report_params(&report_pipeline(), &resolved_resources()).unwrap_err();
        assert!(err.message().contains("BI template ARN"));
    }

    #[test]
    fn missing_endpoint_for_provisioned_is_rejected() {
        let mut pipeline = report_pipeline();
        let warehouse = pipeline
            .data_analytics
            .as_mut()
            .unwrap()
            .redshift
            .as_mut()
            .unwrap();
        warehouse.new_serverless = None;
        warehouse.provisioned = Some(clickstack_config::ProvisionedWarehouseConfig {
            cluster_identifier: "warehouse-1".into(),
            db_user: "admin".into(),
        });
        let err = build_report_params(&pipeline, &report_resources()).unwrap_err();
        assert!(err.message().contains("endpoint"));
    }

    #[test]
    fn analytics_disabled_is_rejected() {
        let mut pipeline = report_pipeline();
        pipeline.data_analytics = None;
        let err = build_report_params(&pipeline, &report_resources()).unwrap_err();
        assert!(err.message().contains("analytics"));
    }
}
