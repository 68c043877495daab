// Operational metrics stack parameters

use clickstack_config::PipelineConfig;
use clickstack_core::Result;

use crate::{ParamSet, Parameter};

const DEFAULT_COLUMN_NUMBER: u32 = 4;
const DEFAULT_LEGEND_POSITION: &str = "bottom";
const DASHBOARD_VERSION: &str = "1";

/// Derive the metrics dashboard stack parameter set.
pub fn build_metrics_params(pipeline: &PipelineConfig) -> Result<Vec<Parameter>> {
    let mut set = ParamSet::new();
    set.push("ProjectId", &pipeline.project_id);
    set.push("ColumnNumber", DEFAULT_COLUMN_NUMBER.to_string());
    set.push("LegendPosition", DEFAULT_LEGEND_POSITION);
    set.push("Version", DASHBOARD_VERSION);
    Ok(set.into_parameters())
}
