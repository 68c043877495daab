// clickstack-params - deployment-template parameter derivation
//
// One builder per deployable stack. Each builder is an explicit mapping
// from (pipeline configuration, resolved resources) to an ordered list of
// (key, value) pairs consumed verbatim by the provisioning engine. Field
// presence policy is ordinary control flow: required fields fail the build
// with a BadRequestError, optional fields fall back to literal defaults,
// conditional fields are only evaluated (and emitted) under their governing
// sink-type or warehouse-mode branch.

use serde::{Deserialize, Serialize};

mod connector;
mod ingestion;
mod metrics;
mod processing;
mod report;
mod warehouse;

pub use connector::build_kafka_connector_params;
pub use ingestion::build_ingestion_server_params;
pub use metrics::build_metrics_params;
pub use processing::build_data_processing_params;
pub use report::build_report_params;
pub use warehouse::build_warehouse_params;

/// Stack output names referenced across stacks by the report builder
pub mod outputs {
    pub const SERVERLESS_WORKGROUP_ENDPOINT_ADDRESS: &str =
        "WarehouseServerlessWorkgroupEndpointAddress";
    pub const SERVERLESS_WORKGROUP_ENDPOINT_PORT: &str =
        "WarehouseServerlessWorkgroupEndpointPort";
    pub const BI_USER_CREDENTIAL_PARAMETER: &str = "BIUserCredentialParameterName";
}

/// Sentinel prefix marking a value as a foreign-stack output reference
const STACK_OUTPUT_SENTINEL: &str = "#.";
/// Sentinel prefix marking a value as a deferred runtime reference
const RUNTIME_SENTINEL: &str = "$.";

/// One deployment-template input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub parameter_key: String,
    pub parameter_value: String,
}

/// Ordered parameter accumulator applying the cross-stack key-rewrite rule:
/// a value starting with `#.` (stack output) or `$.` (runtime reference)
/// suffixes its own key with `.#` / `.$` so the provisioning engine defers
/// resolution instead of treating the value as a literal.
#[derive(Debug, Default)]
pub(crate) struct ParamSet {
    params: Vec<Parameter>,
}

impl ParamSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let key = if value.starts_with(STACK_OUTPUT_SENTINEL) {
            format!("{key}.#")
        } else if value.starts_with(RUNTIME_SENTINEL) {
            format!("{key}.$")
        } else {
            key.to_string()
        };
        self.params.push(Parameter {
            parameter_key: key,
            parameter_value: value,
        });
    }

    pub(crate) fn into_parameters(self) -> Vec<Parameter> {
        self.params
    }
}

pub(crate) mod field {
    use clickstack_core::{BadRequestError, Result};

    /// Required field: present and non-empty, or the build fails.
    pub(crate) fn require(field_name: &str, value: &str) -> Result<String> {
        if value.is_empty() {
            return Err(BadRequestError::new(format!(
                "{field_name} is required and can not be empty."
            )));
        }
        Ok(value.to_string())
    }

    /// Range-constrained numeric field.
    pub(crate) fn require_range<T>(field_name: &str, value: T, min: T, max: T) -> Result<T>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(BadRequestError::new(format!(
                "{field_name} {value} out of range [{min}, {max}]."
            )));
        }
        Ok(value)
    }

    pub(crate) fn yes_no(value: bool) -> &'static str {
        if value {
            "Yes"
        } else {
            "No"
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_values_rewrite_their_key() {
        let mut set = ParamSet::new();
        set.push("Plain", "value");
        set.push("FromStack", "#.Clickstack-DataAnalytics-p1.SomeOutput");
        set.push("Deferred", "$.runtime.path");
        let params = set.into_parameters();

        assert_eq!(params[0].parameter_key, "Plain");
        assert_eq!(params[1].parameter_key, "FromStack.#");
        assert_eq!(
            params[1].parameter_value,
            "#.Clickstack-DataAnalytics-p1.SomeOutput"
        );
        assert_eq!(params[2].parameter_key, "Deferred.$");
    }

    #[test]
    fn parameter_serializes_with_provider_casing() {
        let parameter = Parameter {
            parameter_key: "ProjectId".into(),
            parameter_value: "proj_1".into(),
        };
        let json = serde_json::to_value(&parameter).unwrap();
        assert_eq!(json["ParameterKey"], "ProjectId");
        assert_eq!(json["ParameterValue"], "proj_1");
    }

    #[test]
    fn require_rejects_empty() {
        assert!(field::require("AppIds", "").is_err());
        assert_eq!(field::require("AppIds", "app1").unwrap(), "app1");
    }

    #[test]
    fn require_range_bounds_inclusive() {
        assert!(field::require_range("Rpu", 8u32, 8, 512).is_ok());
        assert!(field::require_range("Rpu", 512u32, 8, 512).is_ok());
        assert!(field::require_range("Rpu", 7u32, 8, 512).is_err());
        assert!(field::require_range("Rpu", 513u32, 8, 512).is_err());
    }
}
