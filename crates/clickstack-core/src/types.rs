// Discriminants shared by the configuration model and the parameter builders

use serde::{Deserialize, Serialize};

/// Destination the ingestion fleet writes events to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkType {
    S3,
    Kafka,
    Kinesis,
}

impl std::fmt::Display for SinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkType::S3 => write!(f, "s3"),
            SinkType::Kafka => write!(f, "kafka"),
            SinkType::Kinesis => write!(f, "kinesis"),
        }
    }
}

/// Deployment mode of the analytics warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarehouseMode {
    Provisioned,
    NewServerless,
    ExistingServerless,
}

impl WarehouseMode {
    /// Template parameter value understood by the warehouse stack
    pub fn as_param_value(&self) -> &'static str {
        match self {
            WarehouseMode::Provisioned => "Provisioned",
            WarehouseMode::NewServerless => "New_Serverless",
            WarehouseMode::ExistingServerless => "Serverless",
        }
    }
}

/// Capacity mode of the streaming sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamMode {
    OnDemand,
    Provisioned,
}

impl StreamMode {
    pub fn as_param_value(&self) -> &'static str {
        match self {
            StreamMode::OnDemand => "ON_DEMAND",
            StreamMode::Provisioned => "PROVISIONED",
        }
    }
}

/// Listener protocol of the ingestion load balancer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServerProtocol {
    Http,
    Https,
}

impl ServerProtocol {
    pub fn as_param_value(&self) -> &'static str {
        match self {
            ServerProtocol::Http => "HTTP",
            ServerProtocol::Https => "HTTPS",
        }
    }
}

/// Environment classification of the owning project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectEnvironment {
    Dev,
    Test,
    Prod,
}
