// Naming rules for derived resources: bucket key prefixes, stack names,
// and the serverless workgroup name with its provider length cap.

use crate::SinkType;

/// Provider limit on warehouse workgroup names
const WORKGROUP_NAME_MAX_LEN: usize = 120;

/// Namespace prefix stamped on every resource this layer creates
const RESOURCE_PREFIX: &str = "Clickstack";

/// Logical purpose of a bucket key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPurpose {
    AlbLogs,
    ConnectorLogs,
    DataBuffer,
    DataOds,
    DataPipelineTemp,
    ConnectorPlugin,
}

impl BucketPurpose {
    fn segment(&self) -> &'static str {
        match self {
            BucketPurpose::AlbLogs => "logs/alb",
            BucketPurpose::ConnectorLogs => "logs/kafka-connect",
            BucketPurpose::DataBuffer => "data/buffer",
            BucketPurpose::DataOds => "data/ods",
            BucketPurpose::DataPipelineTemp => "data/pipeline-temp",
            BucketPurpose::ConnectorPlugin => "plugins/kafka-connect",
        }
    }
}

/// Key prefix for a (project, purpose) pair.
///
/// An explicit non-empty override wins verbatim apart from a guaranteed
/// trailing slash; otherwise the canonical `{purpose}/{projectId}/` path
/// is generated.
pub fn bucket_key_prefix(
    project_id: &str,
    purpose: BucketPurpose,
    override_prefix: Option<&str>,
) -> String {
    match override_prefix {
        Some(prefix) if !prefix.is_empty() => {
            if prefix.ends_with('/') {
                prefix.to_string()
            } else {
                format!("{prefix}/")
            }
        }
        _ => format!("{}/{}/", purpose.segment(), project_id),
    }
}

/// Deployable stack kinds, as they appear in stack names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Ingestion,
    KafkaConnector,
    DataProcessing,
    DataAnalytics,
    Report,
    Metrics,
}

impl StackKind {
    fn label(&self) -> &'static str {
        match self {
            StackKind::Ingestion => "Ingestion",
            StackKind::KafkaConnector => "KafkaConnector",
            StackKind::DataProcessing => "DataProcessing",
            StackKind::DataAnalytics => "DataAnalytics",
            StackKind::Report => "Report",
            StackKind::Metrics => "Metrics",
        }
    }
}

/// Deployment-stack name for a pipeline. The ingestion stack embeds the
/// sink type since switching sinks replaces the whole stack.
pub fn stack_name(pipeline_id: &str, kind: StackKind, sink_type: SinkType) -> String {
    match kind {
        StackKind::Ingestion => format!(
            "{RESOURCE_PREFIX}-{}-{sink_type}-{pipeline_id}",
            kind.label()
        ),
        _ => format!("{RESOURCE_PREFIX}-{}-{pipeline_id}", kind.label()),
    }
}

/// Replace every non-word character with `-` and truncate.
pub fn sanitize_resource_name(raw: &str, max_len: usize) -> String {
    let mut sanitized: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect();
    sanitized.truncate(max_len);
    sanitized
}

/// Workgroup name for a newly provisioned serverless warehouse.
pub fn serverless_workgroup_name(project_id: &str) -> String {
    let name = format!("clickstack-{}", project_id.replace('_', "-"));
    sanitize_resource_name(&name, WORKGROUP_NAME_MAX_LEN)
}
