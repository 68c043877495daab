// String validators used as gates before building parameter sets
//
// Every check fails with a BadRequestError naming the offending field;
// nothing here has side effects.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{BadRequestError, Result, SinkType};

/// Resource-id and format patterns accepted by the deployment templates.
/// All are applied as full matches (anchored by `validate_pattern`).
pub mod patterns {
    pub const VPC_ID: &str = "vpc-[a-f0-9]+";
    /// Comma-delimited subnet ids, at least two
    pub const SUBNETS: &str = "subnet-[a-f0-9]+(,subnet-[a-f0-9]+)+";
    /// Comma-delimited subnet ids spanning at least three zones
    pub const SUBNETS_THREE_AZ: &str = "subnet-[a-f0-9]+(,subnet-[a-f0-9]+){2,}";
    pub const SECURITY_GROUP: &str = "sg-[a-f0-9]+";
    pub const MULTI_SECURITY_GROUP: &str = "sg-[a-f0-9]+(,sg-[a-f0-9]+)*";
    pub const DOMAIN_NAME: &str =
        "[a-zA-Z0-9][a-zA-Z0-9-]{0,62}(\\.[a-zA-Z0-9][a-zA-Z0-9-]{0,62})+";
    pub const KAFKA_BROKERS: &str =
        "([a-zA-Z0-9.-]+:[0-9]+)(,[a-zA-Z0-9.-]+:[0-9]+)*";
    pub const KAFKA_TOPIC: &str = "[a-zA-Z0-9._-]+";
    pub const SCHEDULE_EXPRESSION: &str =
        "(rate\\([0-9]+ (minute|minutes|hour|hours|day|days)\\))|(cron\\([^()]+\\))";
    pub const QUICKSIGHT_USER_NAME: &str = "[a-zA-Z0-9+=,.@/_-]+";
    pub const QUICKSIGHT_NAMESPACE: &str = "[a-zA-Z0-9._-]+";
    pub const S3_PATH_PLUGIN_JARS: &str =
        "s3://[a-z0-9][a-z0-9.-]*/[^,]+\\.jar(,s3://[a-z0-9][a-z0-9.-]*/[^,]+\\.jar)*";
    pub const S3_PATH_PLUGIN_FILES: &str =
        "s3://[a-z0-9][a-z0-9.-]*/[^,]+(,s3://[a-z0-9][a-z0-9.-]*/[^,]+)*";
    pub const IAM_ROLE_ARN: &str = "arn:[a-z-]+:iam::[0-9]{12}:role/.+";
    pub const CIDR: &str =
        "([0-9]{1,3}\\.){3}[0-9]{1,3}/[0-9]{1,2}";
}

// Patterns repeat across builders within one deployment attempt; compile
// each anchored pattern once.
static COMPILED: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn compiled(field_name: &str, pattern: &str) -> Result<Regex> {
    let mut cache = COMPILED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let anchored = format!("^(?:{pattern})$");
    let re = Regex::new(&anchored)
        .map_err(|e| BadRequestError::new(format!("invalid pattern for {field_name}: {e}")))?;
    cache.insert(pattern.to_string(), re.clone());
    Ok(re)
}

/// Check `value` fully matches `pattern`, failing with a descriptive error.
pub fn validate_pattern(field_name: &str, pattern: &str, value: &str) -> Result<()> {
    let re = compiled(field_name, pattern)?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(BadRequestError::new(format!(
            "Validation error: {field_name} '{value}' not match {pattern}. Please check and try again."
        )))
    }
}

/// Like `validate_pattern` but skips empty values.
pub fn validate_pattern_if_present(field_name: &str, pattern: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    validate_pattern(field_name, pattern, value)
}

/// Buffering settings of a sink, validated against per-sink ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkBatch {
    pub size: u32,
    pub interval_seconds: u32,
}

/// Check sink batching settings against the sink type's allowed ranges.
///
/// The object-storage sink buffers through its own byte/timeout knobs and
/// carries no sink-batch contract, so it passes untouched.
pub fn validate_sink_batch(sink_type: SinkType, batch: SinkBatch) -> Result<()> {
    let (size_range, interval_range) = match sink_type {
        SinkType::Kinesis => (1..=10_000u32, 0..=300u32),
        SinkType::Kafka => (1..=50_000u32, 0..=3_000u32),
        SinkType::S3 => return Ok(()),
    };
    if !size_range.contains(&batch.size) {
        return Err(BadRequestError::new(format!(
            "Sink batch size {} out of range [{}, {}] for {} sink.",
            batch.size,
            size_range.start(),
            size_range.end(),
            sink_type
        )));
    }
    if !interval_range.contains(&batch.interval_seconds) {
        return Err(BadRequestError::new(format!(
            "Sink batch interval {} out of range [{}, {}] for {} sink.",
            batch.interval_seconds,
            interval_range.start(),
            interval_range.end(),
            sink_type
        )));
    }
    Ok(())
}
